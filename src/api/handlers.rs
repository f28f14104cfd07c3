//! API Handlers
//!
//! HTTP request handlers for each fetch cache endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::FetchCache;
use crate::error::{FetchError, Result};
use crate::models::{
    DeleteResponse, EntryResponse, EvictResponse, FetchRequest, FetchResponse, HealthResponse,
    StatsResponse,
};
use crate::producer::HttpProducer;
use crate::settings::Settings;
use crate::store::KeyValueStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The fetch cache
    pub cache: Arc<FetchCache>,
    /// Shared key-value store, also holding persisted settings
    pub store: Arc<dyn KeyValueStore>,
    /// Upstream fetcher used as the producer
    pub producer: HttpProducer,
}

impl AppState {
    /// Creates application state over the given store and tuning.
    pub fn new(store: Arc<dyn KeyValueStore>, settings: Settings) -> Self {
        Self {
            cache: Arc::new(FetchCache::new(store.clone(), settings)),
            store,
            producer: HttpProducer::new(),
        }
    }
}

/// Handler for POST /fetch
///
/// Returns the cached value for the request key if fresh, otherwise fetches
/// the upstream URL, stores the result, and returns it.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<FetchResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(FetchError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl_secs.map(Duration::from_secs);
    let producer = state.producer.clone();
    let url = req.url.clone();

    let outcome = state
        .cache
        .get_or_compute(&req.key, ttl, move || async move {
            producer.fetch_json(&url).await
        })
        .await?;

    Ok(Json(FetchResponse::new(req.key, outcome)))
}

/// Handler for GET /entry/:key
///
/// Returns the stored entry without invoking any producer. Stale entries
/// are removed and reported as not found.
pub async fn entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryResponse>> {
    let entry = state.cache.peek(&key).await?;
    Ok(Json(EntryResponse::new(key, entry)))
}

/// Handler for DELETE /entry/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.remove(&key).await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /evict/expired
///
/// Sweeps every entry whose ttl has elapsed.
pub async fn evict_expired_handler(
    State(state): State<AppState>,
) -> Result<Json<EvictResponse>> {
    let removed = state.cache.evict_expired().await?;
    Ok(Json(EvictResponse::new(removed)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.cache.stats().await?;
    let bytes_in_use = state.cache.bytes_in_use().await?;
    Ok(Json(StatsResponse::new(stats, bytes_in_use)))
}

/// Handler for GET /settings
pub async fn get_settings_handler(State(state): State<AppState>) -> Json<Settings> {
    Json(state.cache.settings().await)
}

/// Handler for PUT /settings
///
/// Persists the settings wholesale and applies them to the running cache.
pub async fn put_settings_handler(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>> {
    if let Some(error_msg) = settings.validate() {
        return Err(FetchError::InvalidRequest(error_msg));
    }

    settings.save(state.store.as_ref()).await?;
    state.cache.apply_settings(settings.clone()).await;
    Ok(Json(settings))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
