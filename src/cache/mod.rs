//! Cache Module
//!
//! Time-boxed fetch cache: key-based memoization of asynchronous producers
//! with absolute expiry, single-flight coalescing, and budget eviction.

mod entry;
mod flight;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use flight::FlightGroup;
pub use stats::CacheStats;
pub use store::{FetchCache, FetchOutcome};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Storage key prefix that scopes cache entries within the shared store
pub const CACHE_PREFIX: &str = "cache:";
