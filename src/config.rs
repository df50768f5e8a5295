//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

use crate::cache::engine::validate_namespace;
use crate::eviction::EvictionStrategy;

/// Default byte budget (50 MiB)
pub const DEFAULT_MAX_SIZE: u64 = 50 * 1024 * 1024;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum total payload bytes held in the namespace
    pub max_size: u64,
    /// Eviction strategy used when the budget is exceeded
    pub strategy: EvictionStrategy,
    /// Default TTL in seconds for entries without explicit TTL, None = never expire
    pub default_ttl: Option<u64>,
    /// Prefix that scopes this cache's keys inside the store
    pub namespace: String,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE` - Byte budget (default: 52428800)
    /// - `EVICTION_STRATEGY` - One of lru, lfu, fifo, priority, arc, ttl, size (default: lru)
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 or unset disables expiry
    /// - `CACHE_NAMESPACE` - Key namespace without `:` (default: cache)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_size: parse_var("MAX_SIZE").unwrap_or(defaults.max_size),
            // Unknown names are not an error: they resolve to lru
            strategy: env::var("EVICTION_STRATEGY")
                .ok()
                .map(|name| EvictionStrategy::resolve(&name))
                .unwrap_or(defaults.strategy),
            default_ttl: parse_var::<u64>("DEFAULT_TTL").filter(|ttl| *ttl > 0),
            namespace: env::var("CACHE_NAMESPACE")
                .ok()
                .filter(|ns| match validate_namespace(ns) {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(namespace = %ns, error = %err, "Ignoring CACHE_NAMESPACE");
                        false
                    }
                })
                .unwrap_or(defaults.namespace),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            strategy: EvictionStrategy::Lru,
            default_ttl: None,
            namespace: "cache".to_string(),
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
