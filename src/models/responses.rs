//! Response DTOs for the fetch cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, FetchOutcome};

/// Response body for the fetch operation (POST /fetch)
#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    /// The cache key
    pub key: String,
    /// The cached or freshly computed value
    pub value: Value,
    /// True when the value came from a fresh cache entry
    pub cached: bool,
    /// Entry age in milliseconds (0 when freshly computed)
    pub age_ms: u64,
}

impl FetchResponse {
    /// Creates a FetchResponse from a cache outcome.
    pub fn new(key: impl Into<String>, outcome: FetchOutcome) -> Self {
        Self {
            key: key.into(),
            value: outcome.value,
            cached: outcome.cached,
            age_ms: outcome.age_ms,
        }
    }
}

/// Response body for the entry lookup (GET /entry/:key)
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    /// The cache key
    pub key: String,
    /// The stored value
    pub value: Value,
    /// Entry age in milliseconds
    pub age_ms: u64,
    /// Milliseconds until the entry becomes stale
    pub ttl_remaining_ms: u64,
}

impl EntryResponse {
    /// Creates an EntryResponse from a stored entry.
    pub fn new(key: impl Into<String>, entry: CacheEntry) -> Self {
        Self {
            key: key.into(),
            age_ms: entry.age_ms(),
            ttl_remaining_ms: entry.ttl_remaining_ms(),
            value: entry.value,
        }
    }
}

/// Response body for the delete operation (DELETE /entry/:key)
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

/// Response body for eviction operations (POST /evict/expired)
#[derive(Debug, Clone, Serialize)]
pub struct EvictResponse {
    /// Number of entries removed
    pub removed: usize,
}

impl EvictResponse {
    /// Creates a new EvictResponse
    pub fn new(removed: usize) -> Self {
        Self { removed }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Reads served from a fresh entry
    pub hits: u64,
    /// Reads that found no entry or a stale one
    pub misses: u64,
    /// Entries removed by sweeps or budget eviction
    pub evictions: u64,
    /// Producer invocations issued
    pub producer_calls: u64,
    /// Producer invocations that failed or timed out
    pub producer_failures: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Approximate cache size in bytes
    pub bytes_in_use: u64,
}

impl StatsResponse {
    /// Creates a StatsResponse from a stats snapshot and size measurement.
    pub fn new(stats: CacheStats, bytes_in_use: u64) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            producer_calls: stats.producer_calls,
            producer_failures: stats.producer_failures,
            total_entries: stats.total_entries,
            hit_rate,
            bytes_in_use,
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

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
