//! Key-Value Store Contract
//!
//! The cache treats persistent storage as an external collaborator behind
//! this trait. Writes are whole-value overwrites; there is no field-level
//! mutation.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

// == Key-Value Store Trait ==
/// Asynchronous key-value storage consumed by the cache.
///
/// All operations fail with `FetchError::Storage` when the backing store
/// cannot be read or written.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or None if absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Returns all keys starting with `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}
