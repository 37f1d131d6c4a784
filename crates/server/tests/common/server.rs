//! Server test utilities.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sheetkv_core::config::{AppConfig, StorageConfig};
use sheetkv_server::{AppState, create_router};
use sheetkv_storage::{FilesystemBackend, MemoryBackend, TableStore};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: Option<TempDir>,
}

#[allow(dead_code)]
impl TestServer {
    /// In-memory backend seeded with `tables`, flushed once.
    pub async fn with_tables(tables: Vec<(&str, Vec<(&str, &str)>)>) -> Self {
        let store: Arc<dyn TableStore> = Arc::new(MemoryBackend::from_tables(tables));
        Self::build(AppConfig::for_testing(), store, None).await
    }

    /// Any store, flushed once.
    pub async fn with_store(store: Arc<dyn TableStore>) -> Self {
        Self::build(AppConfig::for_testing(), store, None).await
    }

    /// Empty in-memory backend.
    pub async fn new() -> Self {
        Self::with_tables(vec![]).await
    }

    /// Filesystem backend in a temporary directory.
    pub async fn filesystem() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let path = temp_dir.path().join("tables");
        let store: Arc<dyn TableStore> = Arc::new(
            FilesystemBackend::new(&path)
                .await
                .expect("Failed to create filesystem backend"),
        );
        let mut config = AppConfig::for_testing();
        config.storage = StorageConfig::Filesystem { path };
        Self::build(config, store, Some(temp_dir)).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = AppConfig::for_testing();
        modifier(&mut config);
        Self::build(config, Arc::new(MemoryBackend::new()), None).await
    }

    async fn build(config: AppConfig, store: Arc<dyn TableStore>, temp_dir: Option<TempDir>) -> Self {
        sheetkv_server::metrics::register_metrics();
        let state = AppState::new(config, store);
        state
            .reconciler
            .flush()
            .await
            .expect("Failed to run initial flush");
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request with an optional JSON body and return status and JSON body.
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        json_request(&self.router, method, uri, body).await
    }
}

/// Helper to make JSON requests.
#[allow(dead_code)]
pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
