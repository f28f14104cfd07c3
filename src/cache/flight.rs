//! Single-Flight Module
//!
//! Per-key coordination so that concurrent cache misses for the same key
//! collapse into one producer invocation. Callers acquire the key's flight
//! guard, re-check the store, and only then compute.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

// == Flight Group ==
/// Tracks one async mutex per key currently being computed.
///
/// Idle locks are removed when their last holder releases, so the map only
/// ever holds keys with an active or contended flight.
#[derive(Debug, Default)]
pub struct FlightGroup {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FlightGroup {
    // == Constructor ==
    /// Creates an empty flight group.
    pub fn new() -> Self {
        Self::default()
    }

    // == Acquire ==
    /// Waits for exclusive flight ownership of `key`.
    ///
    /// The returned guard holds the key's lock until dropped. Callers must
    /// re-check the cache after acquiring, since an earlier flight may have
    /// already stored a fresh value.
    pub async fn acquire(&self, key: &str) -> FlightGuard<'_> {
        let slot = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let permit = slot.lock_owned().await;
        FlightGuard {
            group: self,
            key: key.to_string(),
            _permit: permit,
        }
    }

    // == In Flight ==
    /// Number of keys with an active or contended flight.
    pub fn in_flight(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

// == Flight Guard ==
/// Exclusive ownership of one key's flight. Dropping releases the key and
/// prunes its lock from the group when no other caller is waiting.
#[derive(Debug)]
pub struct FlightGuard<'a> {
    group: &'a FlightGroup,
    key: String,
    _permit: OwnedMutexGuard<()>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.group.locks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = locks.get(&self.key) {
            // One reference in the map, one inside this guard's permit;
            // anything above that is a waiting caller.
            if Arc::strong_count(slot) <= 2 {
                locks.remove(&self.key);
            }
        }
    }
}
