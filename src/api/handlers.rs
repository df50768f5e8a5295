//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheEngine, EngineOptions};
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, EvictResponse, GetResponse, HealthResponse, KeysResponse, RemovedResponse,
    SetRequest, SetResponse, StatsResponse,
};
use crate::storage::{EntryStore, InMemoryStore};

/// Application state shared across all handlers.
///
/// Contains the cache engine wrapped in Arc<RwLock<>> for thread-safe access.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache engine
    pub cache: Arc<RwLock<CacheEngine>>,
}

impl AppState {
    /// Creates a new AppState with the given cache engine.
    pub fn new(cache: CacheEngine) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Initializes an in-memory store and an engine with parameters from the Config.
    /// Fails when the configured namespace is not usable.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let store: Arc<dyn EntryStore> = Arc::new(InMemoryStore::new());
        let engine = CacheEngine::new(store, EngineOptions::from(config))?;
        Ok(Self::new(engine))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL, priority and tags.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let (key, value, options) = req.into_parts();
    let mut cache = state.cache.write().await;
    cache.set(&key, value, options).await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: reads update access bookkeeping and stats
    let mut cache = state.cache.write().await;
    let entry = cache.get_entry(&key).await?;

    Ok(Json(GetResponse::new(key, &entry.value, &entry)))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    cache.remove(&key).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Result<Json<KeysResponse>> {
    let cache = state.cache.read().await;
    Ok(Json(KeysResponse::new(cache.keys().await?)))
}

/// Handler for GET /tags/:tag
pub async fn tag_keys_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<KeysResponse>> {
    let cache = state.cache.read().await;
    Ok(Json(KeysResponse::new(cache.keys_by_tag(&tag).await?)))
}

/// Handler for DELETE /tags/:tag
///
/// Removes every entry carrying the tag.
pub async fn invalidate_tag_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<RemovedResponse>> {
    let mut cache = state.cache.write().await;
    let removed = cache.invalidate_tag(&tag).await?;

    Ok(Json(RemovedResponse { removed }))
}

/// Handler for POST /evict
///
/// Runs the eviction policy now, which is a no-op when within budget.
pub async fn evict_handler(State(state): State<AppState>) -> Result<Json<EvictResponse>> {
    let mut cache = state.cache.write().await;
    let report = cache.enforce_budget().await?;
    if report.is_empty() {
        debug!(namespace = cache.namespace(), "Manual eviction found nothing to remove");
    }

    Ok(Json(EvictResponse::from(report)))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<RemovedResponse>> {
    let mut cache = state.cache.write().await;
    let removed = cache.clear().await?;

    Ok(Json(RemovedResponse { removed }))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    let stats = cache.stats();

    Json(StatsResponse::new(&stats, cache.namespace(), cache.max_size(), cache.policy_name()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
