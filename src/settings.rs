//! Persisted Settings Module
//!
//! A flat mapping of option name to value stored wholesale under one key in
//! the shared key-value store. Missing fields are migrated to defaults once
//! at load time via serde field defaults; there is no further schema
//! versioning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::KeyValueStore;

/// Storage key for the settings blob, outside the cache key prefix.
pub const SETTINGS_KEY: &str = "settings";

// == Settings ==
/// Cache tuning options, read on demand and written wholesale on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Default ttl in seconds for entries without an explicit ttl
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    /// Byte budget for all cache entries combined
    #[serde(default = "default_max_cache_bytes")]
    pub max_cache_bytes: u64,
    /// Fraction of entries (oldest first) removed when over budget
    #[serde(default = "default_evict_fraction")]
    pub evict_fraction: f64,
    /// Bound on a single producer invocation, in seconds
    #[serde(default = "default_producer_timeout_secs")]
    pub producer_timeout_secs: u64,
}

fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_max_cache_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_evict_fraction() -> f64 {
    0.25
}

fn default_producer_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
            max_cache_bytes: default_max_cache_bytes(),
            evict_fraction: default_evict_fraction(),
            producer_timeout_secs: default_producer_timeout_secs(),
        }
    }
}

impl Settings {
    // == Load ==
    /// Reads settings from the store, falling back to defaults when absent
    /// or unreadable. Fields missing from the stored blob take their
    /// defaults.
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let settings = match store.get(SETTINGS_KEY).await? {
            Some(raw) => serde_json::from_value(raw).unwrap_or_default(),
            None => Self::default(),
        };
        Ok(settings)
    }

    // == Save ==
    /// Writes the settings wholesale; no partial-field transactions.
    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        let raw = serde_json::to_value(self)
            .map_err(|e| crate::error::FetchError::Storage(e.to_string()))?;
        store.set(SETTINGS_KEY, raw).await
    }

    // == Migrate ==
    /// One-shot startup step: loads, fills missing fields with defaults,
    /// and writes the completed blob back.
    pub async fn migrate(store: &dyn KeyValueStore) -> Result<Self> {
        let settings = Self::load(store).await?;
        settings.save(store).await?;
        Ok(settings)
    }

    // == Validation ==
    /// Returns an error message if any option is out of range.
    pub fn validate(&self) -> Option<String> {
        if self.default_ttl_secs == 0 {
            return Some("default_ttl_secs must be positive".to_string());
        }
        if !(self.evict_fraction > 0.0 && self.evict_fraction <= 1.0) {
            return Some("evict_fraction must be in (0, 1]".to_string());
        }
        if self.producer_timeout_secs == 0 {
            return Some("producer_timeout_secs must be positive".to_string());
        }
        None
    }

    /// Default entry ttl as a Duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Producer invocation bound as a Duration.
    pub fn producer_timeout(&self) -> Duration {
        Duration::from_secs(self.producer_timeout_secs)
    }
}
