//! Shared helpers for victim selection.
//!
//! Every strategy reduces to "order the snapshot, then take keys until the
//! deficit is covered". The ordering differs, the accumulation does not.

use crate::cache::CacheEntry;

/// A borrowed snapshot row.
pub(crate) type Candidate<'a> = &'a (String, CacheEntry);

// == Deficit ==
/// Bytes that must be freed, or None when the snapshot is within budget.
pub(crate) fn deficit(max_size: u64, current_size: u64) -> Option<u64> {
    if current_size <= max_size {
        None
    } else {
        Some(current_size - max_size)
    }
}

// == Take Until Freed ==
/// Walks `ordered` and collects keys until their sizes sum to at least
/// `target`. Stops before looking at the next candidate once the target is
/// met, so the result never over-evicts.
///
/// Returns the chosen keys and the bytes they free.
pub(crate) fn take_until_freed<'a, I>(ordered: I, target: u64) -> (Vec<String>, u64)
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    let mut keys = Vec::new();
    let mut freed: u64 = 0;

    for (key, entry) in ordered {
        if freed >= target {
            break;
        }
        keys.push(key.clone());
        freed = freed.saturating_add(entry.size);
    }

    (keys, freed)
}

// == Sorted ==
/// Returns the snapshot rows ordered by `compare`.
///
/// The sort is stable: rows that compare equal keep their snapshot order,
/// which is what makes every strategy deterministic.
pub(crate) fn sorted_by<'a, F>(entries: &'a [(String, CacheEntry)], mut compare: F) -> Vec<Candidate<'a>>
where
    F: FnMut(&CacheEntry, &CacheEntry) -> std::cmp::Ordering,
{
    let mut rows: Vec<Candidate<'a>> = entries.iter().collect();
    rows.sort_by(|a, b| compare(&a.1, &b.1));
    rows
}
