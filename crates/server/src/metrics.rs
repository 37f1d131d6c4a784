//! Prometheus metrics for the sheetkv server.
//!
//! Counts key-value operations and flushes, and tracks the size of the index
//! after the last flush. Metric labels never carry collection names or keys.
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping and
//! should be network-restricted to the scraper.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use sheetkv_core::ReconcileReport;
use sheetkv_index::{KvError, KvResult};
use std::sync::{LazyLock, Once};
use std::time::Duration;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static KV_OPERATIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "sheetkv_kv_operations_total",
            "Key-value operations by operation and outcome",
        ),
        &["operation", "outcome"],
    )
    .expect("metric creation failed")
});

pub static CONSISTENCY_FAULTS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "sheetkv_consistency_faults_total",
        "Operations that found the index out of step with the backend",
    )
    .expect("metric creation failed")
});

pub static FLUSH_RUNS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("sheetkv_flush_runs_total", "Index rebuilds by outcome"),
        &["outcome"],
    )
    .expect("metric creation failed")
});

pub static FLUSH_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "sheetkv_flush_duration_seconds",
            "Time taken to rebuild the index from the backend",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .expect("metric creation failed")
});

pub static INDEXED_KEYS: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "sheetkv_indexed_keys",
        "Keys indexed by the last successful flush",
    )
    .expect("metric creation failed")
});

pub static DUPLICATE_KEYS: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "sheetkv_duplicate_keys",
        "Distinct duplicated keys found by the last successful flush",
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so tests may build several routers.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(KV_OPERATIONS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(CONSISTENCY_FAULTS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FLUSH_RUNS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FLUSH_DURATION.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(INDEXED_KEYS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(DUPLICATE_KEYS.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

fn outcome(error: &KvError) -> &'static str {
    match error {
        KvError::CollectionNotFound(_) | KvError::KeyNotFound { .. } => "not_found",
        KvError::Conflict(_) => "conflict",
        KvError::InvalidRequest(_) => "invalid",
        KvError::Inconsistent { .. } | KvError::UnreportedAppendRow { .. } => "inconsistent",
        KvError::Backend(_) | KvError::BatchAborted { .. } => "backend_error",
    }
}

/// Record the outcome of a key-value operation.
pub fn record_kv<T>(operation: &str, result: &KvResult<T>) {
    let label = match result {
        Ok(_) => "ok",
        Err(e) => {
            if e.is_inconsistency() {
                CONSISTENCY_FAULTS.inc();
            }
            outcome(e)
        }
    };
    KV_OPERATIONS.with_label_values(&[operation, label]).inc();
}

/// Record a flush run and, on success, the resulting index size.
pub fn record_flush(result: &KvResult<ReconcileReport>, elapsed: Duration) {
    FLUSH_DURATION.observe(elapsed.as_secs_f64());
    match result {
        Ok(report) => {
            FLUSH_RUNS.with_label_values(&["ok"]).inc();
            INDEXED_KEYS.set(i64::try_from(report.total_keys).unwrap_or(i64::MAX));
            DUPLICATE_KEYS.set(i64::try_from(report.duplicate_count()).unwrap_or(i64::MAX));
        }
        Err(_) => FLUSH_RUNS.with_label_values(&["error"]).inc(),
    }
}
