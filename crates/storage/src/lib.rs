//! Table backends for sheetkv.
//!
//! This crate provides:
//! - The [`TableStore`] contract the index engine consumes
//! - An in-memory backend for tests and ephemeral deployments
//! - A local filesystem backend storing one file per collection

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, memory::MemoryBackend};
pub use error::{StorageError, StorageResult};
pub use traits::{AppendOutcome, TableStore};

use sheetkv_core::config::StorageConfig;
use std::sync::Arc;

/// Create a table store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn TableStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
    }
}
