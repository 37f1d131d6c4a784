//! Fault-injecting table store for HTTP tests.

use async_trait::async_trait;
use sheetkv_core::Row;
use sheetkv_storage::{AppendOutcome, MemoryBackend, StorageError, StorageResult, TableStore};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memory backend whose deletes and appends start failing after a set number
/// of successes.
#[allow(dead_code)]
pub struct FailingStore {
    inner: MemoryBackend,
    deletes_allowed: usize,
    appends_allowed: usize,
    deletes: AtomicUsize,
    appends: AtomicUsize,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn new(inner: MemoryBackend) -> Self {
        Self {
            inner,
            deletes_allowed: usize::MAX,
            appends_allowed: usize::MAX,
            deletes: AtomicUsize::new(0),
            appends: AtomicUsize::new(0),
        }
    }

    pub fn fail_deletes_after(mut self, allowed: usize) -> Self {
        self.deletes_allowed = allowed;
        self
    }

    pub fn fail_appends_after(mut self, allowed: usize) -> Self {
        self.appends_allowed = allowed;
        self
    }

    /// Physical rows of a collection.
    pub async fn rows(&self, collection: &str) -> Vec<(String, String)> {
        self.inner.rows(collection).await.unwrap()
    }
}

fn down() -> StorageError {
    StorageError::Unavailable("down".to_string())
}

#[async_trait]
impl TableStore for FailingStore {
    async fn list_collections(&self) -> StorageResult<Vec<String>> {
        self.inner.list_collections().await
    }

    async fn read_key_column(&self, collection: &str) -> StorageResult<Vec<String>> {
        self.inner.read_key_column(collection).await
    }

    async fn read_cell(&self, collection: &str, row: Row) -> StorageResult<Option<String>> {
        self.inner.read_cell(collection, row).await
    }

    async fn write_cell(&self, collection: &str, row: Row, value: &str) -> StorageResult<()> {
        self.inner.write_cell(collection, row, value).await
    }

    async fn append_row(
        &self,
        collection: &str,
        key: &str,
        value: &str,
    ) -> StorageResult<AppendOutcome> {
        if self.appends.fetch_add(1, Ordering::SeqCst) >= self.appends_allowed {
            return Err(down());
        }
        self.inner.append_row(collection, key, value).await
    }

    async fn delete_row(&self, collection: &str, row: Row) -> StorageResult<()> {
        if self.deletes.fetch_add(1, Ordering::SeqCst) >= self.deletes_allowed {
            return Err(down());
        }
        self.inner.delete_row(collection, row).await
    }

    async fn create_collection(&self, name: &str) -> StorageResult<()> {
        self.inner.create_collection(name).await
    }

    async fn delete_collection(&self, name: &str) -> StorageResult<()> {
        self.inner.delete_collection(name).await
    }

    async fn rename_collection(&self, old_name: &str, new_name: &str) -> StorageResult<()> {
        self.inner.rename_collection(old_name, new_name).await
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
