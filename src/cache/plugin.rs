//! Plugin hooks.
//!
//! Plugins observe engine operations after they complete. Every hook has a
//! no-op default, so a plugin only implements what it cares about. Hooks run
//! synchronously inside the engine call and must not block.

use crate::cache::CacheEntry;

pub trait CachePlugin: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn on_set(&self, _key: &str, _entry: &CacheEntry) {}

    fn on_get(&self, _key: &str, _entry: &CacheEntry) {}

    fn on_remove(&self, _key: &str) {}

    /// Called once per eviction run with every key that was removed.
    fn on_evict(&self, _keys: &[String]) {}

    fn on_error(&self, _message: &str) {}
}
