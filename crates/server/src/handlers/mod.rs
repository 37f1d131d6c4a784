//! HTTP request handlers.

pub mod admin;
pub mod collections;
pub mod kv;

pub use admin::*;
pub use collections::*;
pub use kv::*;

use crate::error::{ApiError, ApiResult};
use axum::extract::Request;
use serde::de::DeserializeOwned;

/// Maximum accepted request body size (1 MiB).
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Read and parse a JSON request body, reporting failures as bad requests.
async fn parse_json_body<T: DeserializeOwned>(req: Request) -> ApiResult<T> {
    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))
}
