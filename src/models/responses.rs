//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheEntry, CacheStats, EvictionReport};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value (lossy UTF-8)
    pub value: String,
    /// Reads recorded for the entry, including this one
    pub access_count: u64,
    /// Remaining TTL in seconds, absent when the entry never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    pub priority: Option<i32>,
    pub tags: Vec<String>,
}

impl GetResponse {
    /// Builds the response from the value just read and the entry metadata.
    pub fn new(key: impl Into<String>, value: &[u8], entry: &CacheEntry) -> Self {
        Self {
            key: key.into(),
            value: String::from_utf8_lossy(value).into_owned(),
            access_count: entry.access_count,
            ttl: entry.ttl_remaining(),
            priority: entry.priority,
            tags: entry.tags.iter().cloned().collect(),
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for key listings (GET /keys, GET /tags/:tag)
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
    pub count: usize,
}

impl KeysResponse {
    pub fn new(keys: Vec<String>) -> Self {
        let count = keys.len();
        Self { keys, count }
    }
}

/// Response body for bulk removals (DELETE /tags/:tag, DELETE /clear)
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

/// Response body for a manual eviction run (POST /evict)
#[derive(Debug, Clone, Serialize)]
pub struct EvictResponse {
    /// Keys removed, in eviction order
    pub evicted: Vec<String>,
    pub count: usize,
    /// Bytes released
    pub freed: u64,
    /// Keys the store failed to delete
    pub failed: Vec<String>,
}

impl From<EvictionReport> for EvictResponse {
    fn from(report: EvictionReport) -> Self {
        Self {
            count: report.evicted.len(),
            evicted: report.evicted,
            freed: report.freed,
            failed: report.failed.into_iter().map(|f| f.key).collect(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of TTL expirations
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Current payload bytes in cache
    pub total_size: u64,
    /// Namespace the figures cover
    pub namespace: String,
    /// Byte budget
    pub max_size: u64,
    /// Active eviction policy
    pub strategy: String,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(
        stats: &CacheStats,
        namespace: impl Into<String>,
        max_size: u64,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            total_size: stats.total_size,
            namespace: namespace.into(),
            max_size,
            strategy: strategy.into(),
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
