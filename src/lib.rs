//! fetchbox - A time-boxed fetch cache
//!
//! Wraps arbitrary asynchronous producers with key-based memoization,
//! absolute expiry, single-flight coalescing, and budget-based eviction.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod producer;
pub mod settings;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{FetchCache, FetchOutcome};
pub use config::Config;
pub use settings::Settings;
pub use tasks::spawn_sweep_task;
