//! Eviction Module
//!
//! Decides which entries to remove when the stored bytes exceed the budget.
//!
//! A policy sees a snapshot of `(key, entry)` pairs plus the size bounds and
//! returns keys in removal order. It never touches the store; the engine
//! performs the deletions.
//!
//! ```text
//! snapshot ──► order (strategy specific) ──► take keys until deficit freed
//! ```

mod select;
mod strategy;

#[cfg(test)]
mod property_tests;

pub use strategy::EvictionStrategy;

use crate::cache::CacheEntry;

// == Eviction Policy ==
/// Chooses victims from a snapshot.
///
/// Implementations must return an empty list when
/// `current_size <= max_size`, and otherwise keys whose sizes add up to at
/// least `current_size - max_size`, stopping as soon as that is reached.
/// The same input must always produce the same output.
pub trait EvictionPolicy: Send + Sync {
    /// Returns the keys to delete, first victim first.
    fn should_evict(
        &self,
        entries: &[(String, CacheEntry)],
        max_size: u64,
        current_size: u64,
    ) -> Vec<String>;
}

// == Registry ==
/// Builds a policy from its configuration identifier.
///
/// Recognised names are `lru`, `lfu`, `fifo`, `priority`, `arc`, `ttl` and
/// `size`. Anything else yields LRU.
pub fn create_eviction_policy(name: &str) -> Box<dyn EvictionPolicy> {
    Box::new(EvictionStrategy::resolve(name))
}
