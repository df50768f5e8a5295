//! Cache Engine Module
//!
//! Orchestrates reads and writes against the entry store, keeps the
//! namespace under its byte budget through the configured eviction policy,
//! and reports what happened through statistics, events and plugins.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::events::{CacheEvent, EventBus};
use crate::cache::plugin::CachePlugin;
use crate::cache::{CacheEntry, CacheStats, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::config::{Config, DEFAULT_MAX_SIZE};
use crate::error::{CacheError, Result};
use crate::eviction::{EvictionPolicy, EvictionStrategy};
use crate::storage::EntryStore;

// == Engine Options ==
/// Construction parameters for [`CacheEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Prefix scoping this engine's keys inside the store
    pub namespace: String,
    /// Byte budget for the namespace
    pub max_size: u64,
    /// TTL in seconds applied when a write does not carry one
    pub default_ttl: Option<u64>,
    /// Built-in eviction strategy
    pub strategy: EvictionStrategy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            namespace: "cache".to_string(),
            max_size: DEFAULT_MAX_SIZE,
            default_ttl: None,
            strategy: EvictionStrategy::Lru,
        }
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            namespace: config.namespace.clone(),
            max_size: config.max_size,
            default_ttl: config.default_ttl,
            strategy: config.strategy,
        }
    }
}

// == Set Options ==
/// Per-write metadata.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// TTL in seconds, falls back to the engine default
    pub ttl: Option<u64>,
    pub priority: Option<i32>,
    pub tags: Vec<String>,
}

// == Eviction Report ==
/// Outcome of one eviction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvictionReport {
    /// Keys actually removed, in policy order
    pub evicted: Vec<String>,
    /// Payload bytes released by the removed keys
    pub freed: u64,
    /// Keys the store refused to delete
    pub failed: Vec<FailedDeletion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDeletion {
    pub key: String,
    pub error: String,
}

impl EvictionReport {
    pub fn is_empty(&self) -> bool {
        self.evicted.is_empty() && self.failed.is_empty()
    }
}

/// Separator between namespace and key in store keys.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Rejects namespaces that could collide with another namespace's keys.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Namespace cannot be empty".to_string(),
        ));
    }
    if namespace.contains(NAMESPACE_SEPARATOR) {
        return Err(CacheError::InvalidRequest(format!(
            "Namespace '{}' cannot contain '{}'",
            namespace, NAMESPACE_SEPARATOR
        )));
    }
    Ok(())
}

// == Cache Engine ==
/// Size-budgeted cache over an [`EntryStore`].
pub struct CacheEngine {
    /// Backing store, possibly shared with other engines
    store: Arc<dyn EntryStore>,
    /// Victim selection
    policy: Box<dyn EvictionPolicy>,
    /// Name reported for the active policy
    policy_name: String,
    namespace: String,
    max_size: u64,
    default_ttl: Option<u64>,
    /// Performance statistics
    stats: CacheStats,
    events: EventBus,
    plugins: Vec<Arc<dyn CachePlugin>>,
}

impl CacheEngine {
    // == Constructor ==
    /// Creates an engine over `store` using the strategy named in `options`.
    ///
    /// The namespace must be non-empty and free of the `:` separator, so that
    /// no namespace is a key prefix of another.
    pub fn new(store: Arc<dyn EntryStore>, options: EngineOptions) -> Result<Self> {
        validate_namespace(&options.namespace)?;

        Ok(Self {
            store,
            policy: Box::new(options.strategy),
            policy_name: options.strategy.to_string(),
            namespace: options.namespace,
            max_size: options.max_size,
            default_ttl: options.default_ttl,
            stats: CacheStats::new(),
            events: EventBus::default(),
            plugins: Vec::new(),
        })
    }

    /// Replaces the built-in strategy with a caller-supplied policy.
    pub fn with_policy(mut self, name: impl Into<String>, policy: Box<dyn EvictionPolicy>) -> Self {
        self.policy = policy;
        self.policy_name = name.into();
        self
    }

    pub fn register_plugin(&mut self, plugin: Arc<dyn CachePlugin>) {
        debug!(plugin = plugin.name(), "Plugin registered");
        self.plugins.push(plugin);
    }

    /// Subscribes to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }

    fn store_key(&self, key: &str) -> String {
        format!("{}{}{}", self.namespace, NAMESPACE_SEPARATOR, key)
    }

    fn validate(&self, key: &str, value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if value.len() as u64 > self.max_size {
            return Err(CacheError::InvalidRequest(format!(
                "Value of {} bytes exceeds the cache budget of {} bytes",
                value.len(),
                self.max_size
            )));
        }

        Ok(())
    }

    // == Set ==
    /// Stores a value, then evicts if the namespace went over budget.
    ///
    /// Overwriting a key is a fresh write: timestamps and the access counter
    /// start over. Once the value is stored the write succeeds; a failed
    /// eviction pass afterwards is reported through logs, an `Error` event
    /// and plugin `on_error` hooks, and retried on the next write.
    pub async fn set(&mut self, key: &str, value: impl Into<Vec<u8>>, options: SetOptions) -> Result<()> {
        let value = value.into();
        self.validate(key, &value)?;

        let ttl = options.ttl.or(self.default_ttl);
        let entry = CacheEntry::new(value, ttl)
            .with_priority(options.priority)
            .with_tags(options.tags);
        let size = entry.size;

        self.store.put(&self.store_key(key), entry.clone()).await?;
        self.stats.record_set();
        debug!(key, size, "Entry stored");

        self.events.emit(CacheEvent::Set {
            key: key.to_string(),
            size,
        });
        for plugin in &self.plugins {
            plugin.on_set(key, &entry);
        }

        if let Err(err) = self.enforce_budget().await {
            let message = format!("Eviction after writing '{}' failed: {}", key, err);
            warn!("{}", message);
            for plugin in &self.plugins {
                plugin.on_error(&message);
            }
            self.events.emit(CacheEvent::Error { message });
        }

        Ok(())
    }

    // == Get ==
    /// Reads a value and records the access.
    ///
    /// An expired entry is removed and reported as [`CacheError::Expired`].
    pub async fn get(&mut self, key: &str) -> Result<Vec<u8>> {
        self.get_entry(key).await.map(|entry| entry.value)
    }

    /// Like [`CacheEngine::get`], returning the updated entry with its metadata.
    pub async fn get_entry(&mut self, key: &str) -> Result<CacheEntry> {
        let store_key = self.store_key(key);

        let Some(mut entry) = self.store.get(&store_key).await? else {
            self.stats.record_miss();
            self.events.emit(CacheEvent::Miss {
                key: key.to_string(),
            });
            return Err(CacheError::NotFound(key.to_string()));
        };

        let now = current_timestamp_ms();
        if entry.is_expired_at(now) {
            if self.store.delete(&store_key).await? {
                self.forget(entry.size);
                self.stats.record_expirations(1);
                self.events.emit(CacheEvent::expire(vec![key.to_string()]));
            }
            self.stats.record_miss();
            self.events.emit(CacheEvent::Miss {
                key: key.to_string(),
            });
            return Err(CacheError::Expired(key.to_string()));
        }

        entry.record_access(now);
        self.store.put(&store_key, entry.clone()).await?;
        self.stats.record_hit();

        self.events.emit(CacheEvent::Hit {
            key: key.to_string(),
        });
        for plugin in &self.plugins {
            plugin.on_get(key, &entry);
        }

        Ok(entry)
    }

    // == Peek ==
    /// Reads an entry without access bookkeeping or statistics.
    pub async fn peek(&self, key: &str) -> Result<CacheEntry> {
        match self.store.get(&self.store_key(key)).await? {
            Some(entry) if entry.is_expired() => Err(CacheError::Expired(key.to_string())),
            Some(entry) => Ok(entry),
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    /// True when `key` holds a live entry. Does not count as an access.
    pub async fn has(&self, key: &str) -> Result<bool> {
        Ok(self
            .store
            .get(&self.store_key(key))
            .await?
            .is_some_and(|entry| !entry.is_expired()))
    }

    // == Remove ==
    /// Removes an entry by key.
    pub async fn remove(&mut self, key: &str) -> Result<()> {
        let store_key = self.store_key(key);

        let Some(entry) = self.store.get(&store_key).await? else {
            return Err(CacheError::NotFound(key.to_string()));
        };

        if !self.store.delete(&store_key).await? {
            return Err(CacheError::NotFound(key.to_string()));
        }

        self.forget(entry.size);
        self.stats.record_delete();
        self.events.emit(CacheEvent::Remove {
            key: key.to_string(),
        });
        for plugin in &self.plugins {
            plugin.on_remove(key);
        }

        Ok(())
    }

    // == Clear ==
    /// Removes every entry of this namespace. Other namespaces sharing the
    /// store are untouched.
    ///
    /// Returns the number of entries removed.
    pub async fn clear(&mut self) -> Result<usize> {
        let (entries, _) = self.snapshot().await?;

        let mut removed = 0;
        for (key, _) in &entries {
            if self.store.delete(&self.store_key(key)).await? {
                removed += 1;
            }
        }

        self.resync_stats().await?;
        info!(namespace = %self.namespace, removed, "Cache cleared");
        self.events.emit(CacheEvent::Clear { count: removed });

        Ok(removed)
    }

    // == Keys ==
    /// Live keys of this namespace, in store order.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let now = current_timestamp_ms();
        let (entries, _) = self.snapshot().await?;

        Ok(entries
            .into_iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key)
            .collect())
    }

    /// Live keys carrying `tag`.
    pub async fn keys_by_tag(&self, tag: &str) -> Result<Vec<String>> {
        let now = current_timestamp_ms();
        let (entries, _) = self.snapshot().await?;

        Ok(entries
            .into_iter()
            .filter(|(_, entry)| entry.has_tag(tag) && !entry.is_expired_at(now))
            .map(|(key, _)| key)
            .collect())
    }

    /// Removes every entry carrying `tag` and returns how many went.
    pub async fn invalidate_tag(&mut self, tag: &str) -> Result<usize> {
        let (entries, _) = self.snapshot().await?;

        let mut removed = 0;
        for (key, entry) in entries.iter().filter(|(_, entry)| entry.has_tag(tag)) {
            if !self.store.delete(&self.store_key(key)).await? {
                continue;
            }
            removed += 1;
            self.forget(entry.size);
            self.stats.record_delete();
            self.events.emit(CacheEvent::Remove { key: key.clone() });
            for plugin in &self.plugins {
                plugin.on_remove(key);
            }
        }

        debug!(tag, removed, "Tag invalidated");
        Ok(removed)
    }

    // == Snapshot ==
    /// Every `(key, entry)` pair of this namespace with the namespace prefix
    /// stripped, plus their total size.
    pub async fn snapshot(&self) -> Result<(Vec<(String, CacheEntry)>, u64)> {
        let prefix = format!("{}{}", self.namespace, NAMESPACE_SEPARATOR);

        let entries: Vec<(String, CacheEntry)> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .filter_map(|(key, entry)| {
                key.strip_prefix(&prefix)
                    .map(|bare| (bare.to_string(), entry))
            })
            .collect();
        let total = entries.iter().map(|(_, entry)| entry.size).sum();

        Ok((entries, total))
    }

    // == Enforce Budget ==
    /// Runs the eviction policy over a fresh snapshot and deletes what it
    /// returns.
    ///
    /// Deletion is fail-soft: a key the store refuses is recorded in the
    /// report and the remaining keys are still attempted. A key that has
    /// already disappeared is skipped silently. Statistics are resynced from
    /// the store afterwards.
    pub async fn enforce_budget(&mut self) -> Result<EvictionReport> {
        let (entries, current_size) = self.snapshot().await?;
        self.stats.resync(entries.len(), current_size);

        let victims = self.policy.should_evict(&entries, self.max_size, current_size);
        if victims.is_empty() {
            if current_size > self.max_size {
                warn!(
                    policy = %self.policy_name,
                    current_size,
                    max_size = self.max_size,
                    "Over budget but the policy selected no entries"
                );
            }
            return Ok(EvictionReport::default());
        }

        debug!(
            policy = %self.policy_name,
            candidates = victims.len(),
            current_size,
            max_size = self.max_size,
            "Evicting"
        );

        let sizes: HashMap<&str, u64> = entries
            .iter()
            .map(|(key, entry)| (key.as_str(), entry.size))
            .collect();

        let mut report = EvictionReport::default();
        for key in victims {
            match self.store.delete(&self.store_key(&key)).await {
                Ok(true) => {
                    report.freed += sizes.get(key.as_str()).copied().unwrap_or(0);
                    report.evicted.push(key);
                }
                Ok(false) => debug!(key = %key, "Eviction victim already gone"),
                Err(err) => report.failed.push(FailedDeletion {
                    key,
                    error: err.to_string(),
                }),
            }
        }

        self.stats.record_evictions(report.evicted.len());

        if !report.evicted.is_empty() {
            info!(
                count = report.evicted.len(),
                freed = report.freed,
                policy = %self.policy_name,
                "Evicted entries"
            );
            for plugin in &self.plugins {
                plugin.on_evict(&report.evicted);
            }
            self.events.emit(CacheEvent::evict(report.evicted.clone()));
        }

        if !report.failed.is_empty() {
            let message = format!(
                "Failed to evict {} of {} entries: {}",
                report.failed.len(),
                report.failed.len() + report.evicted.len(),
                report
                    .failed
                    .iter()
                    .map(|f| format!("{} ({})", f.key, f.error))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            warn!("{}", message);
            for plugin in &self.plugins {
                plugin.on_error(&message);
            }
            self.events.emit(CacheEvent::Error { message });
        }

        self.resync_stats().await?;
        Ok(report)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries of this namespace.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&mut self) -> Result<usize> {
        let now = current_timestamp_ms();
        let (entries, _) = self.snapshot().await?;

        let mut expired = Vec::new();
        for (key, entry) in entries {
            if entry.is_expired_at(now) && self.store.delete(&self.store_key(&key)).await? {
                expired.push(key);
            }
        }

        let count = expired.len();
        if count > 0 {
            self.stats.record_expirations(count);
            self.events.emit(CacheEvent::expire(expired));
        }
        self.resync_stats().await?;

        Ok(count)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Re-reads entry count and byte total from the store.
    pub async fn resync_stats(&mut self) -> Result<()> {
        let (entries, total) = self.snapshot().await?;
        self.stats.resync(entries.len(), total);
        Ok(())
    }

    fn forget(&mut self, size: u64) {
        let entries = self.stats.total_entries.saturating_sub(1);
        let bytes = self.stats.total_size.saturating_sub(size);
        self.stats.resync(entries, bytes);
    }
}

impl fmt::Debug for CacheEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEngine")
            .field("namespace", &self.namespace)
            .field("max_size", &self.max_size)
            .field("default_ttl", &self.default_ttl)
            .field("policy", &self.policy_name)
            .field("stats", &self.stats)
            .field("plugins", &self.plugins.len())
            .finish_non_exhaustive()
    }
}
