//! Row index and key-value engine for sheetkv.
//!
//! Every collection lives in a backend table where a key is found only by
//! its row number. This crate keeps the `key -> row` index consistent with
//! the backend across mutations:
//! - [`RowIndex`]: the shared, lock-guarded index
//! - [`KvEngine`]: key-value operations that update the index after every
//!   confirmed backend call
//! - [`Reconciler`]: full rebuilds from the backend's key columns, with
//!   duplicate detection
//! - [`CollectionManager`]: collection create/delete/rename and the index
//!   bookkeeping they trigger

pub mod cache;
pub mod collections;
pub mod engine;
pub mod error;
pub mod sync;

pub use cache::{CollectionGuard, IndexWriteGuard, KeyRows, RowIndex};
pub use collections::CollectionManager;
pub use engine::{KvEngine, UpsertOutcome};
pub use error::{KvError, KvResult};
pub use sync::{Reconciler, ScannedCollection, scan_key_column};
