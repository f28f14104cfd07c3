//! Request DTOs for the fetch cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for the fetch operation (POST /fetch)
///
/// # Fields
/// - `key`: cache key the result is memoized under
/// - `url`: upstream URL fetched on a miss
/// - `ttl_secs`: optional per-entry ttl (uses the settings default if
///   not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    /// The cache key
    pub key: String,
    /// The upstream URL to fetch on a miss
    pub url: String,
    /// Optional ttl in seconds
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl FetchRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        if self.url.is_empty() {
            return Some("Url cannot be empty".to_string());
        }
        if self.ttl_secs == Some(0) {
            return Some("ttl_secs must be positive".to_string());
        }
        None
    }
}
