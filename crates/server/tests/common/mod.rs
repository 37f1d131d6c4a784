//! Common test utilities and fixtures.

pub mod server;
pub mod stores;

#[allow(unused_imports)]
pub use server::*;
#[allow(unused_imports)]
pub use stores::FailingStore;
