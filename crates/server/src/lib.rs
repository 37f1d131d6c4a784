//! HTTP API server for sheetkv.
//!
//! This crate provides the HTTP surface over the key-value engine:
//! - Key-value reads, writes, deletes and paginated listings
//! - Batch get, upsert and delete
//! - Collection create, delete and rename
//! - Index flush and health endpoints
//! - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
