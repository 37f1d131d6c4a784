//! Core domain types for the sheetkv service.
//!
//! A collection is a two-column remote table (key in column A, value in
//! column B) and every key is addressed by its 1-based row number. This crate
//! holds the pieces shared by every layer:
//! - Configuration loaded by the server binary
//! - Request and response models for key-value and reconciliation operations
//! - Offset-based page cursors
//! - Collection name and key validation

pub mod config;
pub mod error;
pub mod model;
pub mod name;
pub mod page;

pub use error::{Error, Result};
pub use model::{
    BatchDeleteResult, BatchGetResult, BatchProgress, BatchUpsertResult, KeyValueEntry, PageResult,
    ReconcileReport,
};
pub use name::{is_blank_key, validate_collection_name, validate_key};
pub use page::PageRequest;

/// 1-based physical row number inside a collection's remote table.
pub type Row = u32;

/// Default number of items returned by a listing page.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Longest accepted collection name, in characters.
pub const MAX_COLLECTION_NAME_LEN: usize = 100;
