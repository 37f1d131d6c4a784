pub mod fixtures;
pub mod stores;

#[allow(unused_imports)]
pub use fixtures::{Harness, assert_index_matches_store, keys, lcg};
#[allow(unused_imports)]
pub use stores::{Faults, RecordingStore};
