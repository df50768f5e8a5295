//! Entry store abstraction.
//!
//! The cache engine persists entries through this trait and never assumes
//! anything about the backend beyond its contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::cache::CacheEntry;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend cannot be reached or refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// The backend reached a state it cannot serve the request from
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Durable mapping from composite key to entry.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Inserts or replaces the entry stored under `key`.
    async fn put(&self, key: &str, entry: CacheEntry) -> Result<(), StoreError>;

    /// Removes `key`. Returns `false` when it was not present, which is not
    /// an error.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;

    /// Every stored `(key, entry)` pair, in the backend's iteration order.
    async fn get_all(&self) -> Result<Vec<(String, CacheEntry)>, StoreError>;
}
