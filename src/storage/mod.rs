//! Storage Module
//!
//! The persistent side of the cache: an async entry-store trait and the
//! bundled in-memory backend.

mod memory;
mod traits;

pub use memory::InMemoryStore;
pub use traits::{EntryStore, StoreError};
