//! Row-index cache.
//!
//! Maps every tracked collection to its `key -> row` table. The cache is a
//! derived view of the backend: it may miss rows the backend holds, but every
//! row it does hold was occupied by that key at the last confirmed mutation
//! or flush.
//!
//! Locking has two levels. The collection map sits behind an `RwLock`; each
//! collection's rows sit behind their own `Mutex`. Key-level operations hold
//! the map's read guard and their collection's mutex for the whole
//! decide-then-mutate cycle, adapter call included, so row numbers cannot
//! shift underneath them. Structural changes and rebuilds take the map's
//! write guard, which waits for every in-flight key-level operation.

use sheetkv_core::Row;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// `key -> row` table of one collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyRows {
    rows: HashMap<String, Row>,
}

impl KeyRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row of `key`, if tracked. `None` only means the key is unknown here.
    pub fn get(&self, key: &str) -> Option<Row> {
        self.rows.get(key).copied()
    }

    /// Insert or overwrite the row of `key`.
    pub fn put(&mut self, key: impl Into<String>, row: Row) {
        self.rows.insert(key.into(), row);
    }

    /// Stop tracking `key`, returning its row.
    pub fn remove(&mut self, key: &str) -> Option<Row> {
        self.rows.remove(key)
    }

    /// Record a confirmed physical delete of `row`, which held `key`.
    ///
    /// Drops `key` and moves every row below `row` up by one, mirroring the
    /// backend's row shift. Call exactly once per successful delete, before
    /// any other mutation on the collection.
    pub fn apply_delete(&mut self, key: &str, row: Row) {
        self.rows.remove(key);
        self.adjust_after_delete(row);
    }

    fn adjust_after_delete(&mut self, deleted: Row) {
        for row in self.rows.values_mut() {
            if *row > deleted {
                *row -= 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tracked entries in ascending row order.
    pub fn ordered(&self) -> Vec<(&str, Row)> {
        let mut entries: Vec<(&str, Row)> =
            self.rows.iter().map(|(k, &r)| (k.as_str(), r)).collect();
        entries.sort_unstable_by_key(|&(_, row)| row);
        entries
    }

    /// Owned copy of the table.
    pub fn to_map(&self) -> HashMap<String, Row> {
        self.rows.clone()
    }
}

impl<K: Into<String>> FromIterator<(K, Row)> for KeyRows {
    fn from_iter<I: IntoIterator<Item = (K, Row)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().map(|(k, r)| (k.into(), r)).collect(),
        }
    }
}

type Slot = Arc<Mutex<KeyRows>>;

fn slot(rows: KeyRows) -> Slot {
    Arc::new(Mutex::new(rows))
}

/// Process-wide row index.
#[derive(Debug, Default)]
pub struct RowIndex {
    state: RwLock<HashMap<String, Slot>>,
}

impl RowIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock one collection for a key-level operation.
    ///
    /// Returns `None` when the collection is not tracked. The guard blocks
    /// structural changes and rebuilds until dropped.
    pub async fn lock_collection(&self, collection: &str) -> Option<CollectionGuard<'_>> {
        let state = self.state.read().await;
        let slot = state.get(collection)?.clone();
        let rows = slot.lock_owned().await;
        Some(CollectionGuard {
            rows,
            _state: state,
        })
    }

    /// Take exclusive access to the whole index.
    pub async fn exclusive(&self) -> IndexWriteGuard<'_> {
        IndexWriteGuard {
            state: self.state.write().await,
        }
    }

    /// Row of `key` in `collection`, if tracked.
    pub async fn get_row(&self, collection: &str, key: &str) -> Option<Row> {
        self.lock_collection(collection).await?.get(key)
    }

    /// Copy of a collection's table, or `None` if it is not tracked.
    pub async fn collection_view(&self, collection: &str) -> Option<HashMap<String, Row>> {
        Some(self.lock_collection(collection).await?.to_map())
    }

    /// Names of tracked collections, sorted.
    pub async fn collection_names(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of keys tracked across all collections.
    pub async fn key_count(&self) -> usize {
        let state = self.state.read().await;
        let mut total = 0;
        for slot in state.values() {
            total += slot.lock().await.len();
        }
        total
    }
}

/// Exclusive hold on one collection's rows.
///
/// Dereferences to [`KeyRows`].
pub struct CollectionGuard<'a> {
    rows: OwnedMutexGuard<KeyRows>,
    _state: RwLockReadGuard<'a, HashMap<String, Slot>>,
}

impl Deref for CollectionGuard<'_> {
    type Target = KeyRows;

    fn deref(&self) -> &KeyRows {
        &self.rows
    }
}

impl DerefMut for CollectionGuard<'_> {
    fn deref_mut(&mut self) -> &mut KeyRows {
        &mut self.rows
    }
}

/// Exclusive hold on the whole index.
///
/// No key-level operation runs while this guard is alive.
pub struct IndexWriteGuard<'a> {
    state: RwLockWriteGuard<'a, HashMap<String, Slot>>,
}

impl IndexWriteGuard<'_> {
    /// Start tracking an empty collection. Existing tables are left as is.
    pub fn ensure_collection(&mut self, name: &str) {
        if !self.state.contains_key(name) {
            self.state.insert(name.to_string(), slot(KeyRows::new()));
        }
    }

    pub fn remove_collection(&mut self, name: &str) {
        self.state.remove(name);
    }

    /// Move a collection's table to a new name. Unknown names are ignored.
    pub fn rename_collection(&mut self, old_name: &str, new_name: &str) {
        if let Some(rows) = self.state.remove(old_name) {
            self.state.insert(new_name.to_string(), rows);
        }
    }

    /// Swap in a freshly built index.
    pub fn replace(&mut self, index: HashMap<String, KeyRows>) {
        *self.state = index
            .into_iter()
            .map(|(name, rows)| (name, slot(rows)))
            .collect();
    }
}
