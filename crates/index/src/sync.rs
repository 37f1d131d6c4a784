//! Reconciliation: rebuild the row index from the backend's key columns.

use crate::cache::{KeyRows, RowIndex};
use crate::error::KvResult;
use sheetkv_core::{ReconcileReport, Row, is_blank_key};
use sheetkv_storage::{StorageError, TableStore};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;
use tracing::{info, warn};

/// Index of one collection plus the keys that appeared more than once.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScannedCollection {
    pub rows: KeyRows,
    /// Repeated keys, each listed once, in the order their first repeat was seen.
    pub duplicates: Vec<String>,
}

/// Build a collection's index from its key column.
///
/// Blank cells occupy a row but no index slot. The first occurrence of a key
/// wins; later ones are reported as duplicates and never indexed.
pub fn scan_key_column(keys: &[String]) -> ScannedCollection {
    let mut scanned = ScannedCollection::default();
    let mut reported = HashSet::new();
    for (i, key) in keys.iter().enumerate() {
        if is_blank_key(key) {
            continue;
        }
        let Ok(row) = Row::try_from(i + 1) else {
            break;
        };
        if scanned.rows.get(key).is_none() {
            scanned.rows.put(key.as_str(), row);
        } else if reported.insert(key.as_str()) {
            scanned.duplicates.push(key.clone());
        }
    }
    scanned
}

/// Runs full index rebuilds.
pub struct Reconciler {
    store: Arc<dyn TableStore>,
    index: Arc<RowIndex>,
    last_synced_at: RwLock<Option<OffsetDateTime>>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn TableStore>, index: Arc<RowIndex>) -> Self {
        Self {
            store,
            index,
            last_synced_at: RwLock::new(None),
        }
    }

    /// Rebuild the whole index from the backend.
    ///
    /// Holds the index exclusively from the first column read until the swap,
    /// so no mutation can land in between. Read-only against the backend. On
    /// failure the previous index is left untouched.
    pub async fn flush(&self) -> KvResult<ReconcileReport> {
        let mut guard = self.index.exclusive().await;

        let names = self.store.list_collections().await?;
        let mut index = HashMap::with_capacity(names.len());
        let mut duplicates = BTreeMap::new();
        for name in &names {
            let keys = self.store.read_key_column(name).await?;
            let scanned = scan_key_column(&keys);
            if !scanned.duplicates.is_empty() {
                warn!(
                    collection = %name,
                    keys = ?scanned.duplicates,
                    "flush.duplicates"
                );
                duplicates.insert(name.clone(), scanned.duplicates);
            }
            index.insert(name.clone(), scanned.rows);
        }

        let total_keys = index.values().map(KeyRows::len).sum();
        guard.replace(index);
        drop(guard);

        let synced_at = OffsetDateTime::now_utc();
        self.set_last_synced_at(synced_at);

        let report = ReconcileReport {
            collections: names.len(),
            total_keys,
            duplicates,
            synced_at,
        };
        info!(
            collections = report.collections,
            total_keys = report.total_keys,
            duplicate_keys = report.duplicate_count(),
            "flush.complete"
        );
        Ok(report)
    }

    /// Completion time of the last successful flush.
    pub fn last_synced_at(&self) -> Option<OffsetDateTime> {
        *self.last_synced_at.read().unwrap_or_else(|poisoned| {
            warn!("last_synced_at RwLock was poisoned, recovering with into_inner()");
            poisoned.into_inner()
        })
    }

    fn set_last_synced_at(&self, at: OffsetDateTime) {
        let mut last = self.last_synced_at.write().unwrap_or_else(|poisoned| {
            warn!("last_synced_at RwLock was poisoned, recovering with into_inner()");
            poisoned.into_inner()
        });
        *last = Some(at);
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Probe the backend.
    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.store.health_check().await
    }
}
