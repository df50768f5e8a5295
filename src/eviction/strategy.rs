//! Built-in eviction strategies.
//!
//! The strategy set is closed, so it is an enum dispatched with a `match`
//! rather than one type per algorithm.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::select::{deficit, sorted_by, take_until_freed, Candidate};
use super::EvictionPolicy;
use crate::cache::entry::current_timestamp_ms;
use crate::cache::CacheEntry;

// == Eviction Strategy ==
/// Named eviction algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Oldest `last_accessed` first
    #[default]
    Lru,
    /// Lowest `access_count` first, stale entries first on ties
    Lfu,
    /// Oldest `created_at` first
    Fifo,
    /// Lowest priority first, stale entries first on ties
    Priority,
    /// Largest entries first
    Size,
    /// Expired entries, then soonest-to-expire
    Ttl,
    /// Once-used entries (LRU order) before frequently used ones (LFU order)
    Arc,
}

impl EvictionStrategy {
    /// Every strategy, in registry order.
    pub const ALL: [EvictionStrategy; 7] = [
        EvictionStrategy::Lru,
        EvictionStrategy::Lfu,
        EvictionStrategy::Fifo,
        EvictionStrategy::Priority,
        EvictionStrategy::Arc,
        EvictionStrategy::Ttl,
        EvictionStrategy::Size,
    ];

    /// Identifier used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Lfu => "lfu",
            EvictionStrategy::Fifo => "fifo",
            EvictionStrategy::Priority => "priority",
            EvictionStrategy::Size => "size",
            EvictionStrategy::Ttl => "ttl",
            EvictionStrategy::Arc => "arc",
        }
    }

    /// Parses a configuration identifier. Case and surrounding whitespace
    /// are ignored; unknown identifiers return None.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(name))
    }

    /// Parses a configuration identifier, falling back to LRU.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(strategy = name, "Unknown eviction strategy, falling back to lru");
            EvictionStrategy::Lru
        })
    }

    // == Select At ==
    /// Chooses victims with an explicit evaluation time for TTL decisions.
    ///
    /// Returns an empty list when `current_size <= max_size`.
    pub fn select_at(
        &self,
        entries: &[(String, CacheEntry)],
        max_size: u64,
        current_size: u64,
        now: u64,
    ) -> Vec<String> {
        let Some(target) = deficit(max_size, current_size) else {
            return Vec::new();
        };

        match self {
            EvictionStrategy::Lru => {
                let ordered = sorted_by(entries, |a, b| a.last_accessed.cmp(&b.last_accessed));
                take_until_freed(ordered, target).0
            }
            EvictionStrategy::Lfu => {
                let ordered = sorted_by(entries, |a, b| {
                    a.access_count
                        .cmp(&b.access_count)
                        .then(a.last_accessed.cmp(&b.last_accessed))
                });
                take_until_freed(ordered, target).0
            }
            EvictionStrategy::Fifo => {
                let ordered = sorted_by(entries, |a, b| a.created_at.cmp(&b.created_at));
                take_until_freed(ordered, target).0
            }
            EvictionStrategy::Priority => {
                let ordered = sorted_by(entries, |a, b| {
                    a.effective_priority()
                        .cmp(&b.effective_priority())
                        .then(a.last_accessed.cmp(&b.last_accessed))
                });
                take_until_freed(ordered, target).0
            }
            EvictionStrategy::Size => {
                let ordered = sorted_by(entries, |a, b| b.size.cmp(&a.size));
                take_until_freed(ordered, target).0
            }
            EvictionStrategy::Ttl => select_ttl(entries, target, now),
            EvictionStrategy::Arc => select_arc(entries, target),
        }
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EvictionPolicy for EvictionStrategy {
    fn should_evict(
        &self,
        entries: &[(String, CacheEntry)],
        max_size: u64,
        current_size: u64,
    ) -> Vec<String> {
        self.select_at(entries, max_size, current_size, current_timestamp_ms())
    }
}

// == TTL ==
/// Two phases: every expired entry regardless of the bytes it frees, then
/// entries that carry an expiry ordered soonest first until the rest of the
/// deficit is covered. Entries without an expiry are never chosen.
fn select_ttl(entries: &[(String, CacheEntry)], target: u64, now: u64) -> Vec<String> {
    let ordered = sorted_by(entries, |a, b| a.expires_at.cmp(&b.expires_at));

    let (expired, live): (Vec<Candidate<'_>>, Vec<Candidate<'_>>) = ordered
        .into_iter()
        .filter(|(_, entry)| entry.expires_at.is_some())
        .partition(|(_, entry)| entry.is_expired_at(now));

    let mut keys: Vec<String> = expired.iter().map(|(key, _)| key.clone()).collect();
    let freed: u64 = expired.iter().map(|(_, entry)| entry.size).sum();

    if freed < target {
        let (more, _) = take_until_freed(live, target - freed);
        keys.extend(more);
    }

    keys
}

// == ARC (simplified) ==
/// Per-call partition into a recency list (read at most once) and a
/// frequency list. There are no ghost lists and no adaptive target size;
/// nothing carries over between calls.
fn select_arc(entries: &[(String, CacheEntry)], target: u64) -> Vec<String> {
    let (mut recent, mut frequent): (Vec<Candidate<'_>>, Vec<Candidate<'_>>) =
        entries.iter().partition(|(_, entry)| entry.access_count <= 1);

    recent.sort_by(|a, b| a.1.last_accessed.cmp(&b.1.last_accessed));
    frequent.sort_by(|a, b| a.1.access_count.cmp(&b.1.access_count));

    take_until_freed(recent.into_iter().chain(frequent), target).0
}
