use sheetkv_storage::{FilesystemBackend, MemoryBackend, TableStore};
use std::sync::Arc;
use tempfile::TempDir;

/// A backend under test. Keeps its temp directory alive for the test's duration.
#[allow(dead_code)]
pub struct TestBackend {
    pub store: Arc<dyn TableStore>,
    _temp_dir: Option<TempDir>,
}

#[allow(dead_code)]
impl TestBackend {
    pub fn name(&self) -> &'static str {
        self.store.backend_name()
    }
}

/// Every backend shipped by the crate, freshly created and empty.
#[allow(dead_code)]
pub async fn backends() -> Vec<TestBackend> {
    let temp_dir = TempDir::new().unwrap();
    let filesystem = FilesystemBackend::new(temp_dir.path().join("tables"))
        .await
        .unwrap();

    vec![
        TestBackend {
            store: Arc::new(MemoryBackend::new()),
            _temp_dir: None,
        },
        TestBackend {
            store: Arc::new(filesystem),
            _temp_dir: Some(temp_dir),
        },
    ]
}

/// Create `collection` and append `rows` in order.
#[allow(dead_code)]
pub async fn seed(store: &dyn TableStore, collection: &str, rows: &[(&str, &str)]) {
    store.create_collection(collection).await.unwrap();
    for (key, value) in rows {
        store.append_row(collection, key, value).await.unwrap();
    }
}
