//! Cache Statistics Module
//!
//! Snapshot of cache performance counters: hits, misses, evictions, and
//! producer activity.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of cache counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Reads served from a fresh entry
    pub hits: u64,
    /// Reads that found no entry or a stale one
    pub misses: u64,
    /// Entries removed by expiry sweeps or budget eviction
    pub evictions: u64,
    /// Producer invocations issued on miss
    pub producer_calls: u64,
    /// Producer invocations that failed or timed out
    pub producer_failures: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    /// Creates a snapshot with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
