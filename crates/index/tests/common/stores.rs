use async_trait::async_trait;
use sheetkv_core::Row;
use sheetkv_storage::{AppendOutcome, MemoryBackend, StorageError, StorageResult, TableStore};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Faults to inject into a [`RecordingStore`].
#[allow(dead_code)]
#[derive(Clone, Debug, Default)]
pub struct Faults {
    /// Fail every delete after this many have succeeded.
    pub fail_delete_after: Option<usize>,
    /// Fail every append after this many have succeeded.
    pub fail_append_after: Option<usize>,
    /// Fail every cell read.
    pub fail_reads: bool,
    /// Fail listing collections.
    pub fail_list: bool,
    /// Perform appends but report no row.
    pub unreported_appends: bool,
}

/// Memory backend that records physical deletes and injects faults.
#[allow(dead_code)]
pub struct RecordingStore {
    inner: MemoryBackend,
    faults: Mutex<Faults>,
    deleted_rows: Mutex<Vec<Row>>,
    deletes: AtomicUsize,
    appends: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn new(inner: MemoryBackend) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
            deleted_rows: Mutex::new(Vec::new()),
            deletes: AtomicUsize::new(0),
            appends: AtomicUsize::new(0),
        }
    }

    pub fn set_faults(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    /// Rows passed to successful `delete_row` calls, in call order.
    pub fn deleted_rows(&self) -> Vec<Row> {
        self.deleted_rows.lock().unwrap().clone()
    }

    /// Physical rows of a collection, bypassing fault injection.
    pub async fn rows(&self, collection: &str) -> Vec<(String, String)> {
        self.inner.rows(collection).await.unwrap()
    }

    /// Append directly to the backend without going through the engine.
    pub async fn append_behind_engine(&self, collection: &str, key: &str, value: &str) {
        self.inner.append_row(collection, key, value).await.unwrap();
    }

    /// Delete directly in the backend without going through the engine.
    pub async fn delete_behind_engine(&self, collection: &str, row: Row) {
        self.inner.delete_row(collection, row).await.unwrap();
    }

    fn faults(&self) -> Faults {
        self.faults.lock().unwrap().clone()
    }
}

fn injected(op: &str) -> StorageError {
    StorageError::Unavailable(format!("injected {op} failure"))
}

#[async_trait]
impl TableStore for RecordingStore {
    async fn list_collections(&self) -> StorageResult<Vec<String>> {
        if self.faults().fail_list {
            return Err(injected("list"));
        }
        self.inner.list_collections().await
    }

    async fn read_key_column(&self, collection: &str) -> StorageResult<Vec<String>> {
        self.inner.read_key_column(collection).await
    }

    async fn read_cell(&self, collection: &str, row: Row) -> StorageResult<Option<String>> {
        if self.faults().fail_reads {
            return Err(injected("read"));
        }
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
        let faults = self.faults();
        if let Some(limit) = faults.fail_append_after
            && self.appends.load(Ordering::SeqCst) >= limit
        {
            return Err(injected("append"));
        }
        let outcome = self.inner.append_row(collection, key, value).await?;
        self.appends.fetch_add(1, Ordering::SeqCst);
        if faults.unreported_appends {
            return Ok(AppendOutcome::Unreported);
        }
        Ok(outcome)
    }

    async fn delete_row(&self, collection: &str, row: Row) -> StorageResult<()> {
        if let Some(limit) = self.faults().fail_delete_after
            && self.deletes.load(Ordering::SeqCst) >= limit
        {
            return Err(injected("delete"));
        }
        self.inner.delete_row(collection, row).await?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.deleted_rows.lock().unwrap().push(row);
        Ok(())
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
        "recording"
    }
}
