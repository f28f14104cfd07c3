//! Property-Based Tests for the Fetch Cache
//!
//! Uses proptest to verify the cache's expiry and eviction contracts over
//! arbitrary entry populations.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::cache::{current_timestamp_ms, CacheEntry, FetchCache, CACHE_PREFIX};
use crate::settings::Settings;
use crate::store::{KeyValueStore, MemoryStore};

// == Test Configuration ==
const TEST_TTL_MS: u64 = 3_600_000;

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,32}".prop_map(|s| s)
}

/// Generates sets of unique cache keys
fn unique_keys_strategy(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(valid_key_strategy(), 1..max)
        .prop_map(|set| set.into_iter().collect())
}

fn test_cache() -> (Arc<MemoryStore>, FetchCache) {
    let store = Arc::new(MemoryStore::new());
    let cache = FetchCache::new(store.clone(), Settings::default());
    (store, cache)
}

async fn seed_entry(store: &MemoryStore, key: &str, value: Value, stored_at: u64, ttl_ms: u64) {
    let entry = CacheEntry {
        value,
        stored_at,
        ttl_ms,
    };
    store
        .set(
            &format!("{CACHE_PREFIX}{key}"),
            serde_json::to_value(&entry).unwrap(),
        )
        .await
        .unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // *For any* key with a fresh entry, get_or_compute SHALL return the
    // stored value without invoking the producer.
    #[test]
    fn prop_fresh_hit_skips_producer(key in valid_key_strategy(), payload in "[a-z0-9 ]{0,64}") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (store, cache) = test_cache();
            seed_entry(&store, &key, json!(payload.clone()), current_timestamp_ms(), TEST_TTL_MS).await;

            let calls = AtomicUsize::new(0);
            let outcome = cache
                .get_or_compute(&key, None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!("should not be computed"))
                })
                .await
                .unwrap();

            prop_assert_eq!(outcome.value, json!(payload));
            prop_assert!(outcome.cached);
            prop_assert_eq!(calls.load(Ordering::SeqCst), 0);
            Ok(())
        })?;
    }

    // *For any* mix of fresh and stale entries, evict_expired SHALL remove
    // every stale entry and leave every fresh entry untouched.
    #[test]
    fn prop_evict_expired_exactness(
        keys in unique_keys_strategy(20),
        stale_mask in prop::collection::vec(any::<bool>(), 20)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (store, cache) = test_cache();
            let now = current_timestamp_ms();

            let mut stale_keys = HashSet::new();
            for (i, key) in keys.iter().enumerate() {
                let stale = stale_mask.get(i).copied().unwrap_or(false);
                if stale {
                    // Written long enough ago that its ttl has fully elapsed
                    seed_entry(&store, key, json!(i), now - 10_000, 1_000).await;
                    stale_keys.insert(key.clone());
                } else {
                    seed_entry(&store, key, json!(i), now, TEST_TTL_MS).await;
                }
            }

            let removed = cache.evict_expired().await.unwrap();
            prop_assert_eq!(removed, stale_keys.len());

            for key in &keys {
                let result = cache.peek(key).await;
                if stale_keys.contains(key) {
                    prop_assert!(result.is_err(), "stale key '{}' should be gone", key);
                } else {
                    prop_assert!(result.is_ok(), "fresh key '{}' should survive", key);
                }
            }
            Ok(())
        })?;
    }

    // *For any* population and fraction, evict_oldest_fraction SHALL remove
    // exactly ceil(n * fraction) entries, oldest first by write timestamp.
    #[test]
    fn prop_evict_oldest_fraction_count_and_order(
        keys in unique_keys_strategy(20),
        percent in 1u32..=100
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (store, cache) = test_cache();
            let now = current_timestamp_ms();
            let n = keys.len();

            // keys[0] is the oldest, keys[n-1] the newest
            for (i, key) in keys.iter().enumerate() {
                let stored_at = now - ((n - i) as u64) * 1_000;
                seed_entry(&store, key, json!(i), stored_at, TEST_TTL_MS).await;
            }

            let fraction = percent as f64 / 100.0;
            let expected = ((n as f64 * fraction).ceil() as usize).min(n);

            let removed = cache.evict_oldest_fraction(fraction).await.unwrap();
            prop_assert_eq!(removed, expected);
            prop_assert_eq!(cache.len().await.unwrap(), n - expected);

            // The oldest `expected` keys are gone, the rest survive
            for (i, key) in keys.iter().enumerate() {
                let result = cache.peek(key).await;
                if i < expected {
                    prop_assert!(result.is_err(), "old key '{}' should be evicted", key);
                } else {
                    prop_assert!(result.is_ok(), "newer key '{}' should survive", key);
                }
            }
            Ok(())
        })?;
    }

    // *For any* population exceeding the byte budget, enforce_budget SHALL
    // evict the oldest configured fraction of entries.
    #[test]
    fn prop_budget_enforcement(keys in unique_keys_strategy(16)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = Arc::new(MemoryStore::new());
            let cache = FetchCache::new(
                store.clone(),
                Settings {
                    max_cache_bytes: 64,
                    evict_fraction: 0.25,
                    ..Settings::default()
                },
            );
            let now = current_timestamp_ms();
            let n = keys.len();

            for (i, key) in keys.iter().enumerate() {
                let stored_at = now - ((n - i) as u64) * 1_000;
                seed_entry(&store, key, json!("x".repeat(64)), stored_at, TEST_TTL_MS).await;
            }
            prop_assert!(cache.bytes_in_use().await.unwrap() > 64);

            let removed = cache.enforce_budget().await.unwrap();
            let expected = ((n as f64 * 0.25).ceil() as usize).min(n);
            prop_assert_eq!(removed, expected);

            // Oldest-first: keys[0..expected] are gone
            for (i, key) in keys.iter().enumerate() {
                let result = cache.peek(key).await;
                if i < expected {
                    prop_assert!(result.is_err());
                } else {
                    prop_assert!(result.is_ok());
                }
            }
            Ok(())
        })?;
    }

    // *For any* key, storing value V1 and then recomputing V2 for the same
    // key SHALL leave exactly one entry holding V2.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in "[a-z0-9 ]{0,64}",
        value2 in "[a-z0-9 ]{0,64}"
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (store, cache) = test_cache();

            // First value, written long enough ago to be stale
            seed_entry(&store, &key, json!(value1), current_timestamp_ms() - 10_000, 1_000).await;

            let recomputed = value2.clone();
            let outcome = cache
                .get_or_compute(&key, None, || async move { Ok(json!(recomputed)) })
                .await
                .unwrap();

            prop_assert_eq!(outcome.value, json!(value2.clone()));
            prop_assert!(!outcome.cached);
            prop_assert_eq!(cache.len().await.unwrap(), 1);

            let entry = cache.peek(&key).await.unwrap();
            prop_assert_eq!(entry.value, json!(value2));
            Ok(())
        })?;
    }
}
