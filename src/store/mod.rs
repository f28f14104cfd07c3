//! Persistent Store Module
//!
//! Key-value storage contract consumed by the cache, plus the in-memory
//! implementation.

mod kv;
mod memory;

pub use kv::KeyValueStore;
pub use memory::MemoryStore;
