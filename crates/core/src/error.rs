//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("invalid limit {limit} (must be between 1 and {max})")]
    InvalidLimit { limit: usize, max: usize },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
