//! Cache Entry Module
//!
//! Defines the stored record with its bookkeeping metadata (timestamps,
//! access counter, size, priority and tags).

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single stored value with the metadata eviction works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Opaque payload, already serialized by the caller
    pub value: Vec<u8>,
    /// Timestamp of the write that created this version (Unix milliseconds)
    pub created_at: u64,
    /// Timestamp of the most recent successful read (Unix milliseconds)
    pub last_accessed: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
    /// Number of successful reads
    pub access_count: u64,
    /// Payload length in bytes, fixed at write time
    pub size: u64,
    /// Caller-assigned priority, None is treated as 0
    pub priority: Option<i32>,
    /// Free-form labels used by tag queries
    pub tags: BTreeSet<String>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a fresh entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl_seconds` - Optional TTL in seconds
    pub fn new(value: Vec<u8>, ttl_seconds: Option<u64>) -> Self {
        Self::new_at(value, ttl_seconds, current_timestamp_ms())
    }

    /// Creates a fresh entry as if written at `now` (Unix milliseconds).
    pub fn new_at(value: Vec<u8>, ttl_seconds: Option<u64>, now: u64) -> Self {
        let expires_at = ttl_seconds.map(|ttl| now.saturating_add(ttl.saturating_mul(1000)));
        let size = value.len() as u64;

        Self {
            value,
            created_at: now,
            last_accessed: now,
            expires_at,
            access_count: 0,
            size,
            priority: None,
            tags: BTreeSet::new(),
        }
    }

    /// Sets the eviction priority.
    pub fn with_priority(mut self, priority: Option<i32>) -> Self {
        self.priority = priority;
        self
    }

    /// Attaches tags to the entry.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Checks expiry against an explicit clock value.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Priority with the absent case folded to 0.
    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(0)
    }

    // == Record Access ==
    /// Records a successful read at `now`.
    ///
    /// `last_accessed` never moves before `created_at` and the access
    /// counter saturates instead of wrapping.
    pub fn record_access(&mut self, now: u64) {
        self.last_accessed = now.max(self.created_at).max(self.last_accessed);
        self.access_count = self.access_count.saturating_add(1);
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired (TTL elapsed)
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }

    /// Returns remaining TTL in seconds, or None if no expiration is set.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.ttl_remaining_ms().map(|ms| ms / 1000)
    }

    /// Checks whether the entry carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the Unix epoch reads as 0.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new(b"test_value".to_vec(), None);

        assert_eq!(entry.value, b"test_value");
        assert_eq!(entry.size, 10);
        assert_eq!(entry.access_count, 0);
        assert_eq!(entry.created_at, entry.last_accessed);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new_at(b"v".to_vec(), Some(60), 1_000);

        assert_eq!(entry.expires_at, Some(61_000));
        assert!(!entry.is_expired_at(60_999));
        assert!(entry.is_expired_at(61_000));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(b"test_value".to_vec(), Some(1));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_ttl_remaining_seconds() {
        let entry = CacheEntry::new(b"test_value".to_vec(), Some(10));

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= 10);
        assert!(remaining >= 9);
    }

    #[test]
    fn test_ttl_remaining_no_expiration() {
        let entry = CacheEntry::new(b"test_value".to_vec(), None);

        assert!(entry.ttl_remaining().is_none());
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = CacheEntry::new_at(b"v".to_vec(), Some(1), 0);

        assert_eq!(entry.ttl_remaining().unwrap(), 0);
        assert_eq!(entry.ttl_remaining_ms().unwrap(), 0);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let mut entry = CacheEntry::new_at(b"test".to_vec(), None, now);
        entry.expires_at = Some(now);

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }

    #[test]
    fn test_record_access_keeps_invariants() {
        let mut entry = CacheEntry::new_at(b"v".to_vec(), None, 5_000);

        // A clock that went backwards must not move last_accessed before created_at
        entry.record_access(4_000);
        assert_eq!(entry.last_accessed, 5_000);
        assert_eq!(entry.access_count, 1);

        entry.record_access(7_000);
        assert_eq!(entry.last_accessed, 7_000);
        assert_eq!(entry.access_count, 2);
    }

    #[test]
    fn test_priority_and_tags() {
        let entry = CacheEntry::new(b"v".to_vec(), None)
            .with_priority(Some(-3))
            .with_tags(["user", "session"]);

        assert_eq!(entry.effective_priority(), -3);
        assert!(entry.has_tag("user"));
        assert!(!entry.has_tag("admin"));

        let plain = CacheEntry::new(b"v".to_vec(), None);
        assert_eq!(plain.effective_priority(), 0);
    }
}
