//! Application state shared across handlers.

use sheetkv_core::config::AppConfig;
use sheetkv_index::{CollectionManager, KvEngine, Reconciler, RowIndex};
use sheetkv_storage::TableStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Table backend.
    pub store: Arc<dyn TableStore>,
    /// Row index shared by the engine, the reconciler and collection management.
    pub index: Arc<RowIndex>,
    /// Key-value engine.
    pub engine: KvEngine,
    /// Collection management.
    pub collections: CollectionManager,
    /// Index rebuilds.
    pub reconciler: Arc<Reconciler>,
}

impl AppState {
    /// Wire the engine, reconciler and collection manager around one empty index.
    pub fn new(config: AppConfig, store: Arc<dyn TableStore>) -> Self {
        let index = Arc::new(RowIndex::new());
        Self {
            config: Arc::new(config),
            engine: KvEngine::new(store.clone(), index.clone()),
            collections: CollectionManager::new(store.clone(), index.clone()),
            reconciler: Arc::new(Reconciler::new(store.clone(), index.clone())),
            store,
            index,
        }
    }
}
