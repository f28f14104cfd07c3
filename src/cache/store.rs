//! Fetch Cache Module
//!
//! The core engine: `get_or_compute` wraps an arbitrary asynchronous
//! producer with key-based memoization and absolute expiry over a shared
//! key-value store. Entries are scoped under `CACHE_PREFIX` so they coexist
//! with other state in the store.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, FlightGroup, CACHE_PREFIX, MAX_KEY_LENGTH};
use crate::error::{FetchError, Result};
use crate::settings::Settings;
use crate::store::KeyValueStore;

// == Fetch Outcome ==
/// Result of a `get_or_compute` call.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The cached or freshly computed value
    pub value: Value,
    /// True when the value was served from a fresh entry
    pub cached: bool,
    /// Age of the entry in milliseconds (0 when freshly computed)
    pub age_ms: u64,
}

// == Fetch Cache ==
/// Time-boxed fetch cache over a shared key-value store.
///
/// Per entry: `absent -> fresh (successful compute) -> stale (ttl elapsed)
/// -> absent (evicted)`. Freshness is decided at read time only; stale
/// entries stay in the store until refreshed or evicted.
pub struct FetchCache {
    /// Shared persistent store
    store: Arc<dyn KeyValueStore>,
    /// Per-key coalescing of concurrent computes
    flights: FlightGroup,
    /// Cache tuning, swappable at runtime
    settings: RwLock<Settings>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    producer_calls: AtomicU64,
    producer_failures: AtomicU64,
}

impl FetchCache {
    // == Constructor ==
    /// Creates a cache over `store` with the given tuning.
    pub fn new(store: Arc<dyn KeyValueStore>, settings: Settings) -> Self {
        Self {
            store,
            flights: FlightGroup::new(),
            settings: RwLock::new(settings),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            producer_calls: AtomicU64::new(0),
            producer_failures: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the current tuning.
    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Swaps in new tuning; takes effect on the next operation.
    pub async fn apply_settings(&self, settings: Settings) {
        *self.settings.write().await = settings;
    }

    // == Get Or Compute ==
    /// Returns the fresh cached value for `key`, or invokes `producer`
    /// exactly once, stores its result, and returns it.
    ///
    /// `ttl` of None uses the configured default. The producer runs under
    /// the configured timeout; on failure or timeout nothing is written and
    /// the error carries the original cause. A storage-write failure after a
    /// successful compute is logged and the computed value is still
    /// returned.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> Result<FetchOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        validate_key(key)?;
        let ttl = self.resolve_ttl(ttl).await?;
        let storage_key = storage_key(key);

        // Fast path: fresh hit without touching the flight group
        if let Some(entry) = self.load_entry(&storage_key).await? {
            if !entry.is_stale() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(FetchOutcome {
                    age_ms: entry.age_ms(),
                    value: entry.value,
                    cached: true,
                });
            }
        }

        let _flight = self.flights.acquire(key).await;

        // Re-check: an earlier flight may have stored a fresh value while
        // this caller was waiting for the lock
        if let Some(entry) = self.load_entry(&storage_key).await? {
            if !entry.is_stale() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(FetchOutcome {
                    age_ms: entry.age_ms(),
                    value: entry.value,
                    cached: true,
                });
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.producer_calls.fetch_add(1, Ordering::Relaxed);

        let timeout = self.settings.read().await.producer_timeout();
        let value = match tokio::time::timeout(timeout, producer()).await {
            Err(_) => {
                self.producer_failures.fetch_add(1, Ordering::Relaxed);
                return Err(FetchError::ProducerTimeout {
                    key: key.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            Ok(Err(source)) => {
                self.producer_failures.fetch_add(1, Ordering::Relaxed);
                return Err(FetchError::ProducerFailed {
                    key: key.to_string(),
                    source,
                });
            }
            Ok(Ok(value)) => value,
        };

        let entry = CacheEntry::new(value.clone(), ttl);
        match serde_json::to_value(&entry) {
            Ok(raw) => match self.store.set(&storage_key, raw).await {
                Ok(()) => {
                    if let Err(err) = self.enforce_budget().await {
                        warn!(key, error = %err, "budget enforcement failed");
                    }
                }
                Err(err) => {
                    warn!(key, error = %err, "cache write failed, returning uncached result");
                }
            },
            Err(err) => {
                warn!(key, error = %err, "cache entry not serializable, returning uncached result");
            }
        }

        Ok(FetchOutcome {
            value,
            cached: false,
            age_ms: 0,
        })
    }

    // == Peek ==
    /// Returns the entry for `key` without invoking any producer.
    ///
    /// A stale entry is removed and reported as expired; an absent key is
    /// not found. Both count as misses.
    pub async fn peek(&self, key: &str) -> Result<CacheEntry> {
        validate_key(key)?;
        let storage_key = storage_key(key);

        match self.load_entry(&storage_key).await? {
            Some(entry) if entry.is_stale() => {
                self.store.remove(&storage_key).await?;
                self.misses.fetch_add(1, Ordering::Relaxed);
                Err(FetchError::Expired(key.to_string()))
            }
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(entry)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Err(FetchError::NotFound(key.to_string()))
            }
        }
    }

    // == Remove ==
    /// Removes the entry for `key`, failing if it does not exist.
    pub async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let storage_key = storage_key(key);

        if self.store.get(&storage_key).await?.is_none() {
            return Err(FetchError::NotFound(key.to_string()));
        }
        self.store.remove(&storage_key).await
    }

    // == Evict Expired ==
    /// Removes every entry whose age has reached its ttl.
    ///
    /// Returns the number of entries removed.
    pub async fn evict_expired(&self) -> Result<usize> {
        let mut removed = 0;
        for storage_key in self.store.list_keys(CACHE_PREFIX).await? {
            if let Some(entry) = self.load_entry(&storage_key).await? {
                if entry.is_stale() {
                    self.store.remove(&storage_key).await?;
                    removed += 1;
                }
            }
        }

        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        Ok(removed)
    }

    // == Evict Oldest Fraction ==
    /// Removes the oldest `fraction` of entries by write timestamp.
    ///
    /// `fraction` must be in (0, 1]. The removal count is rounded up, so a
    /// non-empty cache always loses at least one entry.
    pub async fn evict_oldest_fraction(&self, fraction: f64) -> Result<usize> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(FetchError::InvalidRequest(format!(
                "Eviction fraction must be in (0, 1], got {}",
                fraction
            )));
        }

        let mut entries: Vec<(String, u64)> = Vec::new();
        for storage_key in self.store.list_keys(CACHE_PREFIX).await? {
            let stored_at = match self.load_entry(&storage_key).await? {
                Some(entry) => entry.stored_at,
                None => continue,
            };
            entries.push((storage_key, stored_at));
        }

        if entries.is_empty() {
            return Ok(0);
        }

        entries.sort_by_key(|(_, stored_at)| *stored_at);
        let count = ((entries.len() as f64 * fraction).ceil() as usize).min(entries.len());

        for (storage_key, _) in entries.iter().take(count) {
            self.store.remove(storage_key).await?;
        }

        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
        Ok(count)
    }

    // == Enforce Budget ==
    /// Runs an oldest-fraction eviction when total entry bytes exceed the
    /// configured budget. Returns the number of entries removed.
    pub async fn enforce_budget(&self) -> Result<usize> {
        let (budget, fraction) = {
            let settings = self.settings.read().await;
            (settings.max_cache_bytes, settings.evict_fraction)
        };

        let used = self.bytes_in_use().await?;
        if used <= budget {
            return Ok(0);
        }

        let removed = self.evict_oldest_fraction(fraction).await?;
        debug!(used, budget, removed, "cache over budget, evicted oldest entries");
        Ok(removed)
    }

    // == Bytes In Use ==
    /// Approximate serialized size of all cache entries plus their keys.
    pub async fn bytes_in_use(&self) -> Result<u64> {
        let mut total = 0u64;
        for storage_key in self.store.list_keys(CACHE_PREFIX).await? {
            if let Some(raw) = self.store.get(&storage_key).await? {
                let size = serde_json::to_string(&raw).map(|s| s.len()).unwrap_or(0);
                total += (size + storage_key.len()) as u64;
            }
        }
        Ok(total)
    }

    // == Clear ==
    /// Removes all cache entries. Returns the number removed.
    pub async fn clear(&self) -> Result<usize> {
        let keys = self.store.list_keys(CACHE_PREFIX).await?;
        let count = keys.len();
        for storage_key in keys {
            self.store.remove(&storage_key).await?;
        }
        Ok(count)
    }

    // == Length ==
    /// Current number of entries, fresh and stale alike.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.store.list_keys(CACHE_PREFIX).await?.len())
    }

    // == Stats ==
    /// Snapshot of the performance counters.
    pub async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            producer_calls: self.producer_calls.load(Ordering::Relaxed),
            producer_failures: self.producer_failures.load(Ordering::Relaxed),
            total_entries: self.len().await?,
        })
    }

    // == Internal ==
    async fn resolve_ttl(&self, ttl: Option<Duration>) -> Result<Duration> {
        match ttl {
            Some(ttl) if ttl.is_zero() => Err(FetchError::InvalidRequest(
                "ttl must be positive".to_string(),
            )),
            Some(ttl) => Ok(ttl),
            None => Ok(self.settings.read().await.default_ttl()),
        }
    }

    /// Loads and decodes an entry. Undecodable entries are dropped from the
    /// store and treated as absent.
    async fn load_entry(&self, storage_key: &str) -> Result<Option<CacheEntry>> {
        let Some(raw) = self.store.get(storage_key).await? else {
            return Ok(None);
        };

        match serde_json::from_value(raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => {
                warn!(storage_key, error = %err, "dropping undecodable cache entry");
                self.store.remove(storage_key).await?;
                Ok(None)
            }
        }
    }
}

fn storage_key(key: &str) -> String {
    format!("{CACHE_PREFIX}{key}")
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(FetchError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(FetchError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
