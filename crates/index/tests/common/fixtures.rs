use super::stores::RecordingStore;
use sheetkv_core::Row;
use sheetkv_index::{CollectionManager, KvEngine, Reconciler, RowIndex};
use sheetkv_storage::{MemoryBackend, TableStore};
use std::sync::Arc;

/// Engine, reconciler and collection manager sharing one recording backend.
#[allow(dead_code)]
pub struct Harness {
    pub store: Arc<RecordingStore>,
    pub index: Arc<RowIndex>,
    pub engine: KvEngine,
    pub reconciler: Reconciler,
    pub collections: CollectionManager,
}

#[allow(dead_code)]
impl Harness {
    /// Seed the backend with `tables` and flush once so the index tracks them.
    pub async fn new(tables: Vec<(&str, Vec<(&str, &str)>)>) -> Self {
        let backend = MemoryBackend::from_tables(tables);
        let store = Arc::new(RecordingStore::new(backend));
        let dyn_store: Arc<dyn TableStore> = store.clone();
        let index = Arc::new(RowIndex::new());

        let harness = Self {
            engine: KvEngine::new(dyn_store.clone(), index.clone()),
            reconciler: Reconciler::new(dyn_store.clone(), index.clone()),
            collections: CollectionManager::new(dyn_store, index.clone()),
            store,
            index,
        };
        harness.reconciler.flush().await.unwrap();
        harness
    }

    /// One collection named `users` holding `k1..=kN` with values `v1..=vN`.
    pub async fn numbered(n: usize) -> Self {
        let rows: Vec<(String, String)> = (1..=n)
            .map(|i| (format!("k{i}"), format!("v{i}")))
            .collect();
        let refs: Vec<(&str, &str)> = rows
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        Self::new(vec![("users", refs)]).await
    }

    pub async fn row_of(&self, collection: &str, key: &str) -> Option<Row> {
        self.index.get_row(collection, key).await
    }
}

/// Assert every indexed key sits at its true 1-based position in the backend.
#[allow(dead_code)]
pub async fn assert_index_matches_store(harness: &Harness, collection: &str) {
    let rows = harness.store.rows(collection).await;
    let view = harness
        .index
        .collection_view(collection)
        .await
        .expect("collection tracked");
    for (key, row) in &view {
        let position = (*row as usize).checked_sub(1).expect("rows are 1-based");
        assert_eq!(
            rows.get(position).map(|(k, _)| k.as_str()),
            Some(key.as_str()),
            "index maps {key} to row {row}, backend rows: {rows:?}"
        );
    }
}

/// Owned key list for batch calls.
#[allow(dead_code)]
pub fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

/// Deterministic pseudo-random sequence (same seed, same output).
#[allow(dead_code)]
pub fn lcg(seed: u64) -> impl Iterator<Item = u64> {
    let mut state = seed;
    std::iter::from_fn(move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        Some(state >> 33)
    })
}
