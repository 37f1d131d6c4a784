//! Index and engine error types.

use sheetkv_core::{BatchProgress, Row};
use sheetkv_storage::StorageError;
use thiserror::Error;

/// Errors raised by the key-value engine, reconciliation and collection
/// bookkeeping.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("key not found: {key} in collection {collection}")]
    KeyNotFound { collection: String, key: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] sheetkv_core::Error),

    /// The index points at a row that holds no value. The cache is stale.
    #[error("index maps {collection}/{key} to row {row} but the row holds no value")]
    Inconsistent {
        collection: String,
        key: String,
        row: Row,
    },

    /// An append succeeded but the backend could not say where it landed.
    #[error("backend did not report the row appended for {collection}/{key}")]
    UnreportedAppendRow { collection: String, key: String },

    #[error("backend error: {0}")]
    Backend(#[from] StorageError),

    /// A batch stopped part-way. `partial` holds the results of the items
    /// whose remote operation succeeded before the failure; the index
    /// reflects exactly those.
    #[error("batch aborted after {} completed item(s): {source}", .partial.len())]
    BatchAborted {
        partial: BatchProgress,
        #[source]
        source: Box<KvError>,
    },
}

impl KvError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(sheetkv_core::Error::InvalidRequest(message.into()))
    }

    /// Whether this error means the backend failed or diverged from the index.
    ///
    /// Such faults are not retried here; operators should trigger a flush.
    pub fn is_backend_fault(&self) -> bool {
        matches!(
            self,
            Self::Inconsistent { .. }
                | Self::UnreportedAppendRow { .. }
                | Self::Backend(_)
                | Self::BatchAborted { .. }
        )
    }

    /// Whether this error reports a stale index rather than a failed call.
    pub fn is_inconsistency(&self) -> bool {
        match self {
            Self::Inconsistent { .. } | Self::UnreportedAppendRow { .. } => true,
            Self::BatchAborted { source, .. } => source.is_inconsistency(),
            _ => false,
        }
    }
}

/// Result type for index operations.
pub type KvResult<T> = std::result::Result<T, KvError>;
