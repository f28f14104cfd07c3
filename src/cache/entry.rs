//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with per-entry ttl.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cached value with its write timestamp and ttl.
///
/// Freshness is decided at read time by comparing `stored_at` against the
/// clock; no fresh/stale flag is stored. Stale entries remain physically
/// present until evicted or overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The producer's result
    pub value: Value,
    /// Write timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Duration after which the entry is stale (milliseconds)
    pub ttl_ms: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: current_timestamp_ms(),
            ttl_ms: ttl.as_millis() as u64,
        }
    }

    // == Is Stale ==
    /// Checks whether the entry's ttl has elapsed.
    ///
    /// Boundary condition: the entry is stale once `now - stored_at >= ttl`,
    /// so a caller never receives a value whose full ttl has elapsed.
    pub fn is_stale(&self) -> bool {
        self.age_ms() >= self.ttl_ms
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was written.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.stored_at)
    }

    // == Remaining TTL ==
    /// Milliseconds until the entry becomes stale, 0 if already stale.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.ttl_ms.saturating_sub(self.age_ms())
    }

    // == Approximate Size ==
    /// Serialized size of the entry in bytes, used for budget accounting.
    pub fn approx_size(&self) -> usize {
        serde_json::to_string(self).map(|s| s.len()).unwrap_or(0)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn test_entry_fresh_after_creation() {
        let entry = CacheEntry::new(json!("payload"), Duration::from_secs(60));

        assert!(!entry.is_stale());
        assert!(entry.age_ms() < 1_000);
        assert!(entry.ttl_remaining_ms() > 59_000);
    }

    #[test]
    fn test_entry_becomes_stale() {
        let entry = CacheEntry::new(json!("payload"), Duration::from_millis(50));

        assert!(!entry.is_stale());
        sleep(Duration::from_millis(80));
        assert!(entry.is_stale());
        assert_eq!(entry.ttl_remaining_ms(), 0);
    }

    #[test]
    fn test_staleness_boundary() {
        let entry = CacheEntry {
            value: json!("x"),
            stored_at: current_timestamp_ms(),
            ttl_ms: 0,
        };

        // age >= ttl counts as stale, so a zero ttl is stale immediately
        assert!(entry.is_stale());
    }

    #[test]
    fn test_entry_serde_roundtrip() {
        let entry = CacheEntry::new(json!({"results": [1, 2, 3]}), Duration::from_secs(1));

        let raw = serde_json::to_value(&entry).unwrap();
        let back: CacheEntry = serde_json::from_value(raw).unwrap();

        assert_eq!(back.value, entry.value);
        assert_eq!(back.stored_at, entry.stored_at);
        assert_eq!(back.ttl_ms, entry.ttl_ms);
    }

    #[test]
    fn test_approx_size_grows_with_value() {
        let small = CacheEntry::new(json!("a"), Duration::from_secs(1));
        let large = CacheEntry::new(json!("a".repeat(500)), Duration::from_secs(1));

        assert!(large.approx_size() > small.approx_size());
        assert!(small.approx_size() > 0);
    }
}
