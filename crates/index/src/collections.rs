//! Collection management and the index bookkeeping it triggers.

use crate::cache::RowIndex;
use crate::error::{KvError, KvResult};
use sheetkv_core::validate_collection_name;
use sheetkv_storage::{StorageError, TableStore};
use std::sync::Arc;
use tracing::info;

/// Creates, deletes and renames collections.
///
/// Each operation holds the index exclusively across the existence check, the
/// backend call and the bookkeeping, and only touches the index once the
/// backend call succeeded.
#[derive(Clone)]
pub struct CollectionManager {
    store: Arc<dyn TableStore>,
    index: Arc<RowIndex>,
}

impl CollectionManager {
    pub fn new(store: Arc<dyn TableStore>, index: Arc<RowIndex>) -> Self {
        Self { store, index }
    }

    /// Collection names as reported by the backend.
    pub async fn list(&self) -> KvResult<Vec<String>> {
        Ok(self.store.list_collections().await?)
    }

    pub async fn create(&self, name: &str) -> KvResult<()> {
        validate_collection_name(name)?;
        let mut index = self.index.exclusive().await;

        if self.exists(name).await? {
            return Err(already_exists(name));
        }
        self.store
            .create_collection(name)
            .await
            .map_err(structural_error)?;
        index.ensure_collection(name);
        info!(collection = name, "collection.create");
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> KvResult<()> {
        let mut index = self.index.exclusive().await;

        if !self.exists(name).await? {
            return Err(KvError::CollectionNotFound(name.to_string()));
        }
        self.store
            .delete_collection(name)
            .await
            .map_err(structural_error)?;
        index.remove_collection(name);
        info!(collection = name, "collection.delete");
        Ok(())
    }

    /// Rename a collection; its indexed rows move with it.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> KvResult<()> {
        validate_collection_name(new_name)?;
        let mut index = self.index.exclusive().await;

        let names = self.store.list_collections().await?;
        if !names.iter().any(|n| n == old_name) {
            return Err(KvError::CollectionNotFound(old_name.to_string()));
        }
        if names.iter().any(|n| n == new_name) {
            return Err(already_exists(new_name));
        }
        self.store
            .rename_collection(old_name, new_name)
            .await
            .map_err(structural_error)?;
        index.rename_collection(old_name, new_name);
        info!(from = old_name, to = new_name, "collection.rename");
        Ok(())
    }

    async fn exists(&self, name: &str) -> KvResult<bool> {
        let names = self.store.list_collections().await?;
        Ok(names.iter().any(|n| n == name))
    }
}

fn already_exists(name: &str) -> KvError {
    KvError::Conflict(format!("collection already exists: {name}"))
}

/// Backend outcomes that mean a caller error rather than a failing backend.
fn structural_error(err: StorageError) -> KvError {
    match err {
        StorageError::CollectionExists(name) => already_exists(&name),
        StorageError::CollectionNotFound(name) => KvError::CollectionNotFound(name),
        StorageError::InvalidName(message) => KvError::invalid(message),
        other => KvError::Backend(other),
    }
}
