//! Collection management endpoints.

use super::parse_json_body;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CollectionList {
    pub collections: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameCollectionRequest {
    pub new_name: String,
}

/// GET /v1/collections
pub async fn list_collections(State(state): State<AppState>) -> ApiResult<Json<CollectionList>> {
    let collections = state.collections.list().await?;
    Ok(Json(CollectionList { collections }))
}

/// POST /v1/collections
pub async fn create_collection(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<StatusCode> {
    let body: CreateCollectionRequest = parse_json_body(req).await?;
    state.collections.create(&body.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/collections/{collection}
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> ApiResult<StatusCode> {
    state.collections.delete(&collection).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /v1/collections/{collection} - Rename.
pub async fn rename_collection(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    req: Request,
) -> ApiResult<StatusCode> {
    let body: RenameCollectionRequest = parse_json_body(req).await?;
    state.collections.rename(&collection, &body.new_name).await?;
    Ok(StatusCode::NO_CONTENT)
}
