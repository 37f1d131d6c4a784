//! Request and response models shared by the engine and the HTTP layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A key and its value. Keys are serialized as `id` on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueEntry {
    #[serde(rename = "id")]
    pub key: String,
    pub value: String,
}

impl KeyValueEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One page of a listing in ascending row order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// Offset of the next page; absent on the last page.
    pub next_cursor: Option<String>,
}

/// Outcome of a batch read. Every requested key lands in exactly one list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchGetResult {
    pub found: Vec<KeyValueEntry>,
    pub missing: Vec<String>,
}

/// Outcome of a batch upsert, in processing order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpsertResult {
    /// Keys appended as new rows.
    pub created: Vec<String>,
    /// Keys overwritten in place.
    pub updated: Vec<String>,
}

/// Outcome of a batch delete, in the order the rows were removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDeleteResult {
    pub deleted: Vec<String>,
}

/// Work a batch applied before it stopped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchProgress {
    Upsert(BatchUpsertResult),
    Delete(BatchDeleteResult),
}

impl BatchProgress {
    /// Number of items applied.
    pub fn len(&self) -> usize {
        match self {
            Self::Upsert(result) => result.created.len() + result.updated.len(),
            Self::Delete(result) => result.deleted.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Summary of a full index rebuild.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Number of collections scanned.
    pub collections: usize,
    /// Keys indexed across all collections (first occurrences only).
    pub total_keys: usize,
    /// Collections that contain repeated keys, with each repeated key listed once.
    pub duplicates: BTreeMap<String, Vec<String>>,
    #[serde(with = "time::serde::rfc3339")]
    pub synced_at: OffsetDateTime,
}

impl ReconcileReport {
    /// Total number of distinct duplicated keys across collections.
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.values().map(Vec::len).sum()
    }
}
