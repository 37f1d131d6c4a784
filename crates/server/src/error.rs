//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sheetkv_core::BatchProgress;
use sheetkv_index::KvError;
use sheetkv_storage::StorageError;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Items a batch applied before it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<BatchProgress>,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Kv(#[from] KvError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid request: {0}")]
    Core(#[from] sheetkv_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Kv(e) => match e {
                KvError::CollectionNotFound(_) => "collection_not_found",
                KvError::KeyNotFound { .. } => "key_not_found",
                KvError::Conflict(_) => "conflict",
                KvError::InvalidRequest(_) => "invalid_request",
                KvError::Inconsistent { .. } | KvError::UnreportedAppendRow { .. } => {
                    "index_inconsistent"
                }
                KvError::BatchAborted { .. } => "batch_aborted",
                KvError::Backend(_) => "backend_error",
            },
            Self::Storage(_) => "backend_error",
            Self::Core(_) => "invalid_request",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Kv(e) => match e {
                KvError::CollectionNotFound(_) | KvError::KeyNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                KvError::Conflict(_) => StatusCode::CONFLICT,
                KvError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Core(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Partial batch results carried by an aborted batch.
    pub fn partial(&self) -> Option<&BatchProgress> {
        match self {
            Self::Kv(KvError::BatchAborted { partial, .. }) => Some(partial),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(code = self.code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
            partial: self.partial().cloned(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
