//! Cache Module
//!
//! Provides the size-budgeted cache engine with TTL expiration, pluggable
//! eviction, tags, events and plugin hooks.

pub mod engine;
pub mod entry;
pub mod events;
pub mod plugin;
mod stats;


// Re-export public types
pub use engine::{CacheEngine, EngineOptions, EvictionReport, FailedDeletion, SetOptions};
pub use entry::CacheEntry;
pub use events::CacheEvent;
pub use plugin::CachePlugin;
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
