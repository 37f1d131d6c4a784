//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/v1/health", get(handlers::health_check))
        .route("/v1/flush", post(handlers::flush))
        // Collection management
        .route(
            "/v1/collections",
            get(handlers::list_collections).post(handlers::create_collection),
        )
        .route(
            "/v1/collections/{collection}",
            delete(handlers::delete_collection).patch(handlers::rename_collection),
        )
        // Key-value
        .route("/v1/collections/{collection}/keys", get(handlers::list_keys))
        .route(
            "/v1/collections/{collection}/keys/{key}",
            get(handlers::get_value)
                .put(handlers::put_value)
                .delete(handlers::delete_value),
        )
        .route(
            "/v1/collections/{collection}/entries",
            get(handlers::list_entries),
        )
        .route(
            "/v1/collections/{collection}/batch/get",
            post(handlers::batch_get),
        )
        .route(
            "/v1/collections/{collection}/batch/upsert",
            post(handlers::batch_upsert),
        )
        .route(
            "/v1/collections/{collection}/batch/delete",
            post(handlers::batch_delete),
        );

    let mut router = Router::new().merge(api_routes);

    // The metrics endpoint is unauthenticated; restrict it at the network level.
    if state.config.server.metrics_enabled {
        let metrics_routes = Router::new().route("/metrics", get(metrics_handler));
        router = router.merge(metrics_routes);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
