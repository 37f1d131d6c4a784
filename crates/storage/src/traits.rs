//! Table store trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use sheetkv_core::Row;

/// Result of appending a row.
///
/// Some backends cannot tell which row an append landed on. Callers must not
/// guess in that case; the only safe recovery is a full re-read of the key
/// column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The append was written to this 1-based row.
    Row(Row),
    /// The append succeeded but the backend did not report its row.
    Unreported,
}

impl AppendOutcome {
    /// The reported row, if any.
    pub fn row(self) -> Option<Row> {
        match self {
            Self::Row(row) => Some(row),
            Self::Unreported => None,
        }
    }
}

/// Row-oriented remote table abstraction.
///
/// Every collection is a two-column table: the key in column A and the value
/// in column B. Rows are addressed by their 1-based position only. Each method
/// performs a single remote operation and reports its outcome; retries and
/// timeouts belong to the implementation.
#[async_trait]
pub trait TableStore: Send + Sync + 'static {
    /// List collection names in the backend's native order.
    async fn list_collections(&self) -> StorageResult<Vec<String>>;

    /// Read the whole key column. Index `i` holds the key of row `i + 1`;
    /// blank cells are returned as empty strings.
    async fn read_key_column(&self, collection: &str) -> StorageResult<Vec<String>>;

    /// Read the value cell of a row, or `None` if the row holds no value.
    async fn read_cell(&self, collection: &str, row: Row) -> StorageResult<Option<String>>;

    /// Overwrite the value cell of an existing row.
    async fn write_cell(&self, collection: &str, row: Row, value: &str) -> StorageResult<()>;

    /// Append a `(key, value)` row after the last occupied row.
    async fn append_row(&self, collection: &str, key: &str, value: &str)
    -> StorageResult<AppendOutcome>;

    /// Physically delete a row. Every row after it moves up by one.
    async fn delete_row(&self, collection: &str, row: Row) -> StorageResult<()>;

    /// Create an empty collection.
    async fn create_collection(&self, name: &str) -> StorageResult<()>;

    /// Delete a collection and all of its rows.
    async fn delete_collection(&self, name: &str) -> StorageResult<()>;

    /// Rename a collection, keeping its rows.
    async fn rename_collection(&self, old_name: &str, new_name: &str) -> StorageResult<()>;

    /// Static identifier of the backend (e.g., "memory", "filesystem").
    /// Used for metrics, logging and health reporting.
    fn backend_name(&self) -> &'static str;

    /// Verify the backend is reachable and properly configured.
    ///
    /// The default implementation returns Ok(()), suitable for backends with
    /// nothing to probe.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
