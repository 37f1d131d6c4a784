//! Storage error types.

use sheetkv_core::Row;
use thiserror::Error;

/// Table backend errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("collection already exists: {0}")]
    CollectionExists(String),

    #[error("row {row} out of range in collection {collection}")]
    RowOutOfRange { collection: String, row: Row },

    #[error("invalid collection name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt table data: {0}")]
    Corrupt(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
