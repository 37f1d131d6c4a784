//! Health and index maintenance endpoints.

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use sheetkv_core::ReconcileReport;
use sheetkv_index::KvResult;
use std::time::Instant;
use time::OffsetDateTime;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
    /// Completion time of the last successful flush, if any.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_synced_at: Option<OffsetDateTime>,
}

/// GET /v1/health - Health check.
///
/// Probes the backend; an unreachable backend yields 503.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.reconciler.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.reconciler.backend_name(),
        last_synced_at: state.reconciler.last_synced_at(),
    }))
}

/// POST /v1/flush - Rebuild the index from the backend.
pub async fn flush(State(state): State<AppState>) -> ApiResult<Json<ReconcileReport>> {
    Ok(Json(run_flush(&state).await?))
}

/// Run one flush and record its metrics. Shared by the endpoint, startup and
/// the periodic task.
pub async fn run_flush(state: &AppState) -> KvResult<ReconcileReport> {
    let started = Instant::now();
    let result = state.reconciler.flush().await;
    metrics::record_flush(&result, started.elapsed());
    result
}
