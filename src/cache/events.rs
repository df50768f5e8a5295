//! Cache Events
//!
//! Structured notifications broadcast by the engine. Subscribers receive a
//! clone of every event sent after they subscribed; a subscriber that falls
//! behind skips the oldest events (`broadcast` semantics).

use serde::Serialize;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the slowest one starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

// == Cache Event ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CacheEvent {
    /// A value was written
    Set { key: String, size: u64 },
    /// A read found a live entry
    Hit { key: String },
    /// A read found nothing
    Miss { key: String },
    /// An entry was removed on request
    Remove { key: String },
    /// Entries whose TTL elapsed were removed
    Expire { keys: Vec<String>, count: usize },
    /// The eviction policy removed entries to get back under budget
    Evict { keys: Vec<String>, count: usize },
    /// The namespace was emptied
    Clear { count: usize },
    /// An operation partially failed without aborting
    Error { message: String },
}

impl CacheEvent {
    pub fn evict(keys: Vec<String>) -> Self {
        let count = keys.len();
        CacheEvent::Evict { keys, count }
    }

    pub fn expire(keys: Vec<String>) -> Self {
        let count = keys.len();
        CacheEvent::Expire { keys, count }
    }
}

// == Event Bus ==
/// Thin wrapper over a broadcast sender.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CacheEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.sender.subscribe()
    }

    /// Sends to current subscribers. Having none is not an error.
    pub fn emit(&self, event: CacheEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}
