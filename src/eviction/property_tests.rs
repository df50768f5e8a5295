//! Property-Based Tests for Eviction Policies
//!
//! Uses proptest to check the contract every strategy shares, plus the
//! ordering each one promises.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::CacheEntry;
use crate::eviction::{create_eviction_policy, EvictionPolicy, EvictionStrategy};

// == Test Configuration ==
const NOW: u64 = 10_000;

// == Strategies ==
/// Raw metadata for one generated entry.
#[derive(Debug, Clone)]
struct EntrySpec {
    size: usize,
    created_at: u64,
    idle_gap: u64,
    access_count: u64,
    priority: Option<i32>,
    expires_in: Option<i64>,
}

fn entry_spec_strategy() -> impl Strategy<Value = EntrySpec> {
    (
        1usize..200,
        0u64..5_000,
        0u64..5_000,
        0u64..6,
        prop::option::of(-5i32..5),
        prop::option::of(-3_000i64..3_000),
    )
        .prop_map(
            |(size, created_at, idle_gap, access_count, priority, expires_in)| EntrySpec {
                size,
                created_at,
                idle_gap,
                access_count,
                priority,
                expires_in,
            },
        )
}

fn build_snapshot(specs: &[EntrySpec]) -> Vec<(String, CacheEntry)> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let mut entry = CacheEntry::new_at(vec![0; spec.size], None, spec.created_at)
                .with_priority(spec.priority);
            entry.last_accessed = spec.created_at + spec.idle_gap;
            entry.access_count = spec.access_count;
            entry.expires_at = spec
                .expires_in
                .map(|offset| (NOW as i64 + offset).max(0) as u64);
            (format!("k{}", i), entry)
        })
        .collect()
}

fn snapshot_strategy() -> impl Strategy<Value = Vec<(String, CacheEntry)>> {
    prop::collection::vec(entry_spec_strategy(), 1..40).prop_map(|specs| build_snapshot(&specs))
}

fn strategy_strategy() -> impl Strategy<Value = EvictionStrategy> {
    prop::sample::select(EvictionStrategy::ALL.to_vec())
}

fn total_size(entries: &[(String, CacheEntry)]) -> u64 {
    entries.iter().map(|(_, e)| e.size).sum()
}

fn size_of(entries: &[(String, CacheEntry)], key: &str) -> u64 {
    entries
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, e)| e.size)
        .unwrap_or(0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Within budget every strategy is a no-op.
    #[test]
    fn prop_under_budget_returns_nothing(
        entries in snapshot_strategy(),
        strategy in strategy_strategy(),
        headroom in 0u64..1_000
    ) {
        let current = total_size(&entries);
        let result = strategy.select_at(&entries, current + headroom, current, NOW);
        prop_assert!(result.is_empty());
    }

    // Returned keys are unique and come from the snapshot.
    #[test]
    fn prop_keys_unique_and_known(
        entries in snapshot_strategy(),
        strategy in strategy_strategy(),
        max_fraction in 0u64..100
    ) {
        let current = total_size(&entries);
        let max_size = current * max_fraction / 100;
        let result = strategy.select_at(&entries, max_size, current, NOW);

        let known: HashSet<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        let mut seen = HashSet::new();
        for key in &result {
            prop_assert!(known.contains(key.as_str()), "unknown key {}", key);
            prop_assert!(seen.insert(key.clone()), "duplicate key {}", key);
        }
    }

    // Sufficient and minimal for every strategy that may pick any entry.
    #[test]
    fn prop_frees_deficit_without_over_evicting(
        entries in snapshot_strategy(),
        strategy in prop::sample::select(vec![
            EvictionStrategy::Lru,
            EvictionStrategy::Lfu,
            EvictionStrategy::Fifo,
            EvictionStrategy::Priority,
            EvictionStrategy::Size,
            EvictionStrategy::Arc,
        ]),
        max_fraction in 0u64..100
    ) {
        let current = total_size(&entries);
        let max_size = current * max_fraction / 100;
        prop_assume!(current > max_size);
        let deficit = current - max_size;

        let result = strategy.select_at(&entries, max_size, current, NOW);
        let freed: u64 = result.iter().map(|k| size_of(&entries, k)).sum();
        prop_assert!(freed >= deficit, "{} freed {} < deficit {}", strategy, freed, deficit);

        let last = result.last().map(|k| size_of(&entries, k)).unwrap_or(0);
        prop_assert!(freed - last < deficit, "{} kept going past the deficit", strategy);
    }

    // LRU victims are a prefix of ascending last_accessed order.
    #[test]
    fn prop_lru_follows_last_accessed(
        entries in snapshot_strategy(),
        max_fraction in 0u64..100
    ) {
        let current = total_size(&entries);
        let max_size = current * max_fraction / 100;
        let result = EvictionStrategy::Lru.select_at(&entries, max_size, current, NOW);

        let mut expected: Vec<&(String, CacheEntry)> = entries.iter().collect();
        expected.sort_by_key(|(_, e)| e.last_accessed);
        let expected: Vec<String> = expected
            .iter()
            .take(result.len())
            .map(|(k, _)| k.clone())
            .collect();
        prop_assert_eq!(result, expected);
    }

    // FIFO victims are a prefix of ascending created_at order.
    #[test]
    fn prop_fifo_follows_created_at(
        entries in snapshot_strategy(),
        max_fraction in 0u64..100
    ) {
        let current = total_size(&entries);
        let max_size = current * max_fraction / 100;
        let result = EvictionStrategy::Fifo.select_at(&entries, max_size, current, NOW);

        let mut expected: Vec<&(String, CacheEntry)> = entries.iter().collect();
        expected.sort_by_key(|(_, e)| e.created_at);
        let expected: Vec<String> = expected
            .iter()
            .take(result.len())
            .map(|(k, _)| k.clone())
            .collect();
        prop_assert_eq!(result, expected);
    }

    // ARC takes every once-used victim before any frequently used one, each
    // group in its own order.
    #[test]
    fn prop_arc_recent_before_frequent(
        entries in snapshot_strategy(),
        max_fraction in 0u64..100
    ) {
        let current = total_size(&entries);
        let max_size = current * max_fraction / 100;
        let result = EvictionStrategy::Arc.select_at(&entries, max_size, current, NOW);

        let lookup = |key: &str| entries.iter().find(|(k, _)| k == key).map(|(_, e)| e.clone());
        let recent_total = entries.iter().filter(|(_, e)| e.access_count <= 1).count();

        let mut seen_frequent = false;
        for key in &result {
            let entry = lookup(key).unwrap();
            if entry.access_count <= 1 {
                prop_assert!(!seen_frequent, "recent entry {} after a frequent one", key);
            } else {
                seen_frequent = true;
            }
        }
        if seen_frequent {
            let chosen_recent = result
                .iter()
                .filter(|k| lookup(k).map(|e| e.access_count <= 1).unwrap_or(false))
                .count();
            prop_assert_eq!(chosen_recent, recent_total);
        }

        for pair in result.windows(2) {
            let (a, b) = (lookup(&pair[0]).unwrap(), lookup(&pair[1]).unwrap());
            match (a.access_count <= 1, b.access_count <= 1) {
                (true, true) => prop_assert!(a.last_accessed <= b.last_accessed),
                (false, false) => prop_assert!(a.access_count <= b.access_count),
                _ => {}
            }
        }
    }

    // Among LFU victims sharing an access count, older accesses go first.
    #[test]
    fn prop_lfu_ties_ordered_by_recency(
        entries in snapshot_strategy(),
        max_fraction in 0u64..100
    ) {
        let current = total_size(&entries);
        let max_size = current * max_fraction / 100;
        let result = EvictionStrategy::Lfu.select_at(&entries, max_size, current, NOW);

        let lookup = |key: &str| entries.iter().find(|(k, _)| k == key).map(|(_, e)| e.clone());
        for pair in result.windows(2) {
            let (a, b) = (lookup(&pair[0]).unwrap(), lookup(&pair[1]).unwrap());
            prop_assert!(a.access_count <= b.access_count);
            if a.access_count == b.access_count {
                prop_assert!(a.last_accessed <= b.last_accessed);
            }
        }
    }

    // Expired entries all come before any live one, and entries without an
    // expiry never appear.
    #[test]
    fn prop_ttl_expired_first(
        entries in snapshot_strategy(),
        max_fraction in 0u64..100
    ) {
        let current = total_size(&entries);
        let max_size = current * max_fraction / 100;
        let result = EvictionStrategy::Ttl.select_at(&entries, max_size, current, NOW);

        let lookup = |key: &str| entries.iter().find(|(k, _)| k == key).map(|(_, e)| e.clone());
        let expired_total = entries.iter().filter(|(_, e)| e.is_expired_at(NOW)).count();

        if current > max_size {
            let chosen_expired = result
                .iter()
                .filter(|k| lookup(k).map(|e| e.is_expired_at(NOW)).unwrap_or(false))
                .count();
            prop_assert_eq!(chosen_expired, expired_total);
        }

        let mut seen_live = false;
        for key in &result {
            let entry = lookup(key).unwrap();
            prop_assert!(entry.expires_at.is_some());
            if entry.is_expired_at(NOW) {
                prop_assert!(!seen_live, "expired entry {} after a live one", key);
            } else {
                seen_live = true;
            }
        }
    }

    // Priority 100 is never taken while a priority 0 entry alone covers the deficit.
    #[test]
    fn prop_priority_protects_high_priority(
        low_size in 10usize..100,
        high_size in 1usize..100,
        extra in 0u64..10
    ) {
        let low = CacheEntry::new_at(vec![0; low_size], None, 5).with_priority(Some(0));
        let high = CacheEntry::new_at(vec![0; high_size], None, 1).with_priority(Some(100));
        let entries = vec![("high".to_string(), high), ("low".to_string(), low)];

        let current = (low_size + high_size) as u64;
        let deficit = (low_size as u64).saturating_sub(extra).max(1);
        let result = EvictionStrategy::Priority.select_at(&entries, current - deficit, current, NOW);
        prop_assert_eq!(result, vec!["low".to_string()]);
    }

    // Same snapshot, same answer.
    #[test]
    fn prop_idempotent(
        entries in snapshot_strategy(),
        strategy in strategy_strategy(),
        max_fraction in 0u64..100
    ) {
        let current = total_size(&entries);
        let max_size = current * max_fraction / 100;
        let first = strategy.select_at(&entries, max_size, current, NOW);
        let second = strategy.select_at(&entries, max_size, current, NOW);
        prop_assert_eq!(first, second);
    }

    // Unknown identifiers behave exactly like LRU.
    #[test]
    fn prop_unknown_strategy_is_lru(
        entries in snapshot_strategy(),
        name in "[a-z]{6,12}",
        max_fraction in 0u64..100
    ) {
        prop_assume!(EvictionStrategy::from_name(&name).is_none());
        let current = total_size(&entries);
        let max_size = current * max_fraction / 100;

        let unknown = create_eviction_policy(&name);
        let lru = create_eviction_policy("lru");
        prop_assert_eq!(
            unknown.should_evict(&entries, max_size, current),
            lru.should_evict(&entries, max_size, current)
        );
    }
}
