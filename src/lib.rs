//! kvcache - A size-budgeted key-value cache server
//!
//! Stores opaque values with TTL, priority and tag metadata, and keeps each
//! namespace under a byte budget with pluggable eviction policies.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod eviction;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheEngine, EngineOptions, SetOptions};
pub use config::Config;
pub use eviction::{create_eviction_policy, EvictionPolicy, EvictionStrategy};
pub use storage::{EntryStore, InMemoryStore};
pub use tasks::spawn_cleanup_task;
