//! Key-value operations over the row index and a table backend.

use crate::cache::{CollectionGuard, KeyRows, RowIndex};
use crate::error::{KvError, KvResult};
use sheetkv_core::{
    BatchDeleteResult, BatchGetResult, BatchProgress, BatchUpsertResult, KeyValueEntry, PageRequest,
    PageResult, Row, validate_key,
};
use sheetkv_storage::TableStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// How an upsert was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The key was new and appended at this row.
    Created(Row),
    /// The key existed and its value was overwritten in place at this row.
    Updated(Row),
}

impl UpsertOutcome {
    pub fn row(self) -> Row {
        match self {
            Self::Created(row) | Self::Updated(row) => row,
        }
    }
}

/// Key-value engine.
///
/// Every key-level operation first locks its collection in the index, then
/// performs its adapter calls and index updates while holding that lock.
#[derive(Clone)]
pub struct KvEngine {
    store: Arc<dyn TableStore>,
    index: Arc<RowIndex>,
}

impl KvEngine {
    pub fn new(store: Arc<dyn TableStore>, index: Arc<RowIndex>) -> Self {
        Self { store, index }
    }

    pub fn index(&self) -> &Arc<RowIndex> {
        &self.index
    }

    async fn collection(&self, collection: &str) -> KvResult<CollectionGuard<'_>> {
        self.index
            .lock_collection(collection)
            .await
            .ok_or_else(|| KvError::CollectionNotFound(collection.to_string()))
    }

    /// Read the value of `key`.
    pub async fn get(&self, collection: &str, key: &str) -> KvResult<String> {
        let rows = self.collection(collection).await?;
        let row = rows.get(key).ok_or_else(|| key_not_found(collection, key))?;
        self.read_tracked(collection, key, row).await
    }

    /// Insert `key` or overwrite its value.
    pub async fn upsert(&self, collection: &str, key: &str, value: &str) -> KvResult<UpsertOutcome> {
        validate_key(key)?;
        let mut rows = self.collection(collection).await?;
        self.upsert_locked(&mut rows, collection, key, value).await
    }

    /// Delete `key` and its row.
    pub async fn delete(&self, collection: &str, key: &str) -> KvResult<()> {
        let mut rows = self.collection(collection).await?;
        let row = rows.get(key).ok_or_else(|| key_not_found(collection, key))?;
        self.delete_locked(&mut rows, collection, key, row).await?;
        Ok(())
    }

    /// One page of keys in ascending row order.
    pub async fn list_keys(&self, collection: &str, page: PageRequest) -> KvResult<PageResult<String>> {
        let rows = self.collection(collection).await?;
        let ordered = rows.ordered();
        let items = ordered
            .iter()
            .skip(page.offset())
            .take(page.limit())
            .map(|&(key, _)| key.to_string())
            .collect();
        Ok(PageResult {
            items,
            next_cursor: page.next_cursor(ordered.len()),
        })
    }

    /// One page of entries in ascending row order. Reads one cell per item.
    pub async fn list_entries(
        &self,
        collection: &str,
        page: PageRequest,
    ) -> KvResult<PageResult<KeyValueEntry>> {
        let rows = self.collection(collection).await?;
        let ordered = rows.ordered();
        let mut items = Vec::with_capacity(page.limit().min(ordered.len()));
        for &(key, row) in ordered.iter().skip(page.offset()).take(page.limit()) {
            let value = self.read_tracked(collection, key, row).await?;
            items.push(KeyValueEntry::new(key, value));
        }
        Ok(PageResult {
            items,
            next_cursor: page.next_cursor(ordered.len()),
        })
    }

    /// Read many keys. Unknown keys and rows without a value are reported as
    /// missing; a failing backend call fails the whole batch.
    pub async fn batch_get(&self, collection: &str, keys: &[String]) -> KvResult<BatchGetResult> {
        if keys.is_empty() {
            return Err(KvError::invalid("ids must not be empty"));
        }
        let rows = self.collection(collection).await?;

        let mut result = BatchGetResult::default();
        for key in dedup(keys) {
            let Some(row) = rows.get(key) else {
                result.missing.push(key.to_string());
                continue;
            };
            match self.store.read_cell(collection, row).await? {
                Some(value) => result.found.push(KeyValueEntry::new(key, value)),
                None => {
                    warn!(collection, key, row, "indexed row holds no value");
                    result.missing.push(key.to_string());
                }
            }
        }
        Ok(result)
    }

    /// Upsert many entries in input order.
    ///
    /// All keys are validated before anything is written. If a write fails
    /// part-way, the error names the keys already applied.
    pub async fn batch_upsert(
        &self,
        collection: &str,
        entries: &[KeyValueEntry],
    ) -> KvResult<BatchUpsertResult> {
        if entries.is_empty() {
            return Err(KvError::invalid("items must not be empty"));
        }
        for entry in entries {
            validate_key(&entry.key)?;
        }
        let mut rows = self.collection(collection).await?;

        let mut result = BatchUpsertResult::default();
        for entry in entries {
            let outcome = match self
                .upsert_locked(&mut rows, collection, &entry.key, &entry.value)
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => return Err(abort(BatchProgress::Upsert(result), e)),
            };
            match outcome {
                UpsertOutcome::Created(_) => result.created.push(entry.key.clone()),
                UpsertOutcome::Updated(_) => result.updated.push(entry.key.clone()),
            }
        }
        Ok(result)
    }

    /// Delete many keys. Unknown keys are skipped.
    ///
    /// Rows are deleted from the bottom up so that every row number still to
    /// be used stays valid, and the index is shifted after each delete.
    pub async fn batch_delete(&self, collection: &str, keys: &[String]) -> KvResult<BatchDeleteResult> {
        if keys.is_empty() {
            return Err(KvError::invalid("ids must not be empty"));
        }
        let mut rows = self.collection(collection).await?;

        let mut targets: Vec<(String, Row)> = dedup(keys)
            .into_iter()
            .filter_map(|key| rows.get(key).map(|row| (key.to_string(), row)))
            .collect();
        targets.sort_unstable_by(|a, b| b.1.cmp(&a.1));

        let mut result = BatchDeleteResult::default();
        for (key, row) in targets {
            if let Err(e) = self.delete_locked(&mut rows, collection, &key, row).await {
                return Err(abort(BatchProgress::Delete(result), e));
            }
            result.deleted.push(key);
        }
        Ok(result)
    }

    async fn read_tracked(&self, collection: &str, key: &str, row: Row) -> KvResult<String> {
        match self.store.read_cell(collection, row).await? {
            Some(value) => Ok(value),
            None => {
                warn!(collection, key, row, "indexed row holds no value; index is stale");
                Err(KvError::Inconsistent {
                    collection: collection.to_string(),
                    key: key.to_string(),
                    row,
                })
            }
        }
    }

    async fn upsert_locked(
        &self,
        rows: &mut KeyRows,
        collection: &str,
        key: &str,
        value: &str,
    ) -> KvResult<UpsertOutcome> {
        if let Some(row) = rows.get(key) {
            self.store.write_cell(collection, row, value).await?;
            info!(collection, key, row, "kv.update");
            return Ok(UpsertOutcome::Updated(row));
        }

        let outcome = self.store.append_row(collection, key, value).await?;
        let Some(row) = outcome.row() else {
            warn!(collection, key, "append did not report its row; flush required");
            return Err(KvError::UnreportedAppendRow {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        };
        rows.put(key, row);
        info!(collection, key, row, "kv.append");
        Ok(UpsertOutcome::Created(row))
    }

    async fn delete_locked(
        &self,
        rows: &mut KeyRows,
        collection: &str,
        key: &str,
        row: Row,
    ) -> KvResult<()> {
        self.store.delete_row(collection, row).await?;
        rows.apply_delete(key, row);
        info!(collection, key, row, "kv.delete");
        Ok(())
    }
}

fn key_not_found(collection: &str, key: &str) -> KvError {
    KvError::KeyNotFound {
        collection: collection.to_string(),
        key: key.to_string(),
    }
}

/// Wrap a failure inside a batch. With nothing applied yet the error is
/// returned unchanged.
fn abort(partial: BatchProgress, source: KvError) -> KvError {
    if partial.is_empty() {
        return source;
    }
    KvError::BatchAborted {
        partial,
        source: Box::new(source),
    }
}

/// Keys in input order with repeats removed.
fn dedup(keys: &[String]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter()
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect()
}
