//! Key-value endpoints.

use super::parse_json_body;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_kv;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use serde::Deserialize;
use sheetkv_core::{
    BatchDeleteResult, BatchGetResult, BatchUpsertResult, KeyValueEntry, PageRequest, PageResult,
};

/// Listing query parameters. Kept as strings so malformed values surface as
/// our own error body rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

impl ListParams {
    fn page(&self, state: &AppState) -> ApiResult<PageRequest> {
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
                sheetkv_core::Error::InvalidRequest(format!(
                    "limit must be a positive integer: {raw}"
                ))
            })?),
        };
        let server = &state.config.server;
        Ok(PageRequest::from_params(
            limit,
            self.cursor.as_deref(),
            server.default_page_limit,
            server.max_page_limit,
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub struct PutValueRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchIdsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchUpsertRequest {
    pub items: Vec<KeyValueEntry>,
}

/// GET /v1/collections/{collection}/keys/{key}
pub async fn get_value(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
) -> ApiResult<Json<KeyValueEntry>> {
    let result = state.engine.get(&collection, &key).await;
    record_kv("get", &result);
    Ok(Json(KeyValueEntry::new(key, result?)))
}

/// PUT /v1/collections/{collection}/keys/{key}
pub async fn put_value(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
    req: Request,
) -> ApiResult<StatusCode> {
    let body: PutValueRequest = parse_json_body(req).await?;
    let result = state.engine.upsert(&collection, &key, &body.value).await;
    record_kv("upsert", &result);
    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/collections/{collection}/keys/{key}
pub async fn delete_value(
    State(state): State<AppState>,
    Path((collection, key)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let result = state.engine.delete(&collection, &key).await;
    record_kv("delete", &result);
    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/collections/{collection}/keys?limit&cursor
pub async fn list_keys(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageResult<String>>> {
    let page = params.page(&state)?;
    let result = state.engine.list_keys(&collection, page).await;
    record_kv("list_keys", &result);
    Ok(Json(result?))
}

/// GET /v1/collections/{collection}/entries?limit&cursor
pub async fn list_entries(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageResult<KeyValueEntry>>> {
    let page = params.page(&state)?;
    let result = state.engine.list_entries(&collection, page).await;
    record_kv("list_entries", &result);
    Ok(Json(result?))
}

/// POST /v1/collections/{collection}/batch/get
pub async fn batch_get(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    req: Request,
) -> ApiResult<Json<BatchGetResult>> {
    let body: BatchIdsRequest = parse_json_body(req).await?;
    let result = state.engine.batch_get(&collection, &body.ids).await;
    record_kv("batch_get", &result);
    Ok(Json(result?))
}

/// POST /v1/collections/{collection}/batch/upsert
pub async fn batch_upsert(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    req: Request,
) -> ApiResult<Json<BatchUpsertResult>> {
    let body: BatchUpsertRequest = parse_json_body(req).await?;
    let result = state.engine.batch_upsert(&collection, &body.items).await;
    record_kv("batch_upsert", &result);
    Ok(Json(result?))
}

/// POST /v1/collections/{collection}/batch/delete
pub async fn batch_delete(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    req: Request,
) -> ApiResult<Json<BatchDeleteResult>> {
    let body: BatchIdsRequest = parse_json_body(req).await?;
    let result = state.engine.batch_delete(&collection, &body.ids).await;
    record_kv("batch_delete", &result);
    result.map(Json).map_err(ApiError::from)
}
