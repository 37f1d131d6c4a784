//! In-memory table backend.

use crate::error::{StorageError, StorageResult};
use crate::traits::{AppendOutcome, TableStore};
use async_trait::async_trait;
use sheetkv_core::{Row, validate_collection_name};
use tokio::sync::RwLock;
use tracing::instrument;

/// A single collection: rows of `(key, value)` in physical order.
#[derive(Clone, Debug)]
struct Table {
    name: String,
    rows: Vec<(String, String)>,
}

/// Process-local table store.
///
/// Collections are kept in creation order. Deleting a row removes it from the
/// vector, so every row after it moves up by one exactly as in the remote
/// spreadsheet backends this models.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<Vec<Table>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-populated with tables.
    ///
    /// Rows may contain blank or repeated keys; nothing is validated.
    pub fn from_tables<I, N, R, K, V>(tables: I) -> Self
    where
        I: IntoIterator<Item = (N, R)>,
        N: Into<String>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let tables = tables
            .into_iter()
            .map(|(name, rows)| Table {
                name: name.into(),
                rows: rows
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            })
            .collect();
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Snapshot of a collection's rows in physical order.
    pub async fn rows(&self, collection: &str) -> Option<Vec<(String, String)>> {
        let tables = self.tables.read().await;
        tables
            .iter()
            .find(|t| t.name == collection)
            .map(|t| t.rows.clone())
    }
}

fn find<'a>(tables: &'a [Table], name: &str) -> StorageResult<&'a Table> {
    tables
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))
}

fn find_mut<'a>(tables: &'a mut [Table], name: &str) -> StorageResult<&'a mut Table> {
    tables
        .iter_mut()
        .find(|t| t.name == name)
        .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))
}

/// Convert a 1-based row into a vector index, if it addresses an existing row.
fn row_index(table: &Table, row: Row) -> Option<usize> {
    let idx = usize::try_from(row).ok()?.checked_sub(1)?;
    (idx < table.rows.len()).then_some(idx)
}

fn out_of_range(collection: &str, row: Row) -> StorageError {
    StorageError::RowOutOfRange {
        collection: collection.to_string(),
        row,
    }
}

#[async_trait]
impl TableStore for MemoryBackend {
    async fn list_collections(&self) -> StorageResult<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables.iter().map(|t| t.name.clone()).collect())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn read_key_column(&self, collection: &str) -> StorageResult<Vec<String>> {
        let tables = self.tables.read().await;
        let table = find(&tables, collection)?;
        Ok(table.rows.iter().map(|(k, _)| k.clone()).collect())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn read_cell(&self, collection: &str, row: Row) -> StorageResult<Option<String>> {
        let tables = self.tables.read().await;
        let table = find(&tables, collection)?;
        Ok(row_index(table, row).map(|idx| table.rows[idx].1.clone()))
    }

    #[instrument(skip(self, value), fields(backend = "memory"))]
    async fn write_cell(&self, collection: &str, row: Row, value: &str) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        let table = find_mut(&mut tables, collection)?;
        let idx = row_index(table, row).ok_or_else(|| out_of_range(collection, row))?;
        table.rows[idx].1 = value.to_string();
        Ok(())
    }

    #[instrument(skip(self, value), fields(backend = "memory"))]
    async fn append_row(
        &self,
        collection: &str,
        key: &str,
        value: &str,
    ) -> StorageResult<AppendOutcome> {
        let mut tables = self.tables.write().await;
        let table = find_mut(&mut tables, collection)?;
        table.rows.push((key.to_string(), value.to_string()));
        let row = Row::try_from(table.rows.len())
            .map_err(|_| StorageError::Corrupt(format!("{collection}: too many rows")))?;
        Ok(AppendOutcome::Row(row))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete_row(&self, collection: &str, row: Row) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        let table = find_mut(&mut tables, collection)?;
        let idx = row_index(table, row).ok_or_else(|| out_of_range(collection, row))?;
        table.rows.remove(idx);
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn create_collection(&self, name: &str) -> StorageResult<()> {
        validate_collection_name(name).map_err(|e| StorageError::InvalidName(e.to_string()))?;
        let mut tables = self.tables.write().await;
        if tables.iter().any(|t| t.name == name) {
            return Err(StorageError::CollectionExists(name.to_string()));
        }
        tables.push(Table {
            name: name.to_string(),
            rows: Vec::new(),
        });
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete_collection(&self, name: &str) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.len();
        tables.retain(|t| t.name != name);
        if tables.len() == before {
            return Err(StorageError::CollectionNotFound(name.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn rename_collection(&self, old_name: &str, new_name: &str) -> StorageResult<()> {
        validate_collection_name(new_name)
            .map_err(|e| StorageError::InvalidName(e.to_string()))?;
        let mut tables = self.tables.write().await;
        if tables.iter().any(|t| t.name == new_name) {
            return Err(StorageError::CollectionExists(new_name.to_string()));
        }
        find_mut(&mut tables, old_name)?.name = new_name.to_string();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
