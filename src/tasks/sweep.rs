//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries and
//! enforces the byte budget. Lazy deletion on read remains the primary
//! mechanism; this is the eager path.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::FetchCache;

/// Spawns a background task that periodically sweeps the cache.
///
/// Each pass evicts all expired entries, then runs a budget check that
/// evicts the oldest fraction of entries if total size exceeds the
/// configured byte budget.
///
/// # Arguments
/// * `cache` - Shared fetch cache
/// * `sweep_interval_secs` - Interval in seconds between sweep runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweep_task(cache: Arc<FetchCache>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            match cache.evict_expired().await {
                Ok(0) => debug!("sweep: no expired entries found"),
                Ok(removed) => info!("sweep: removed {} expired entries", removed),
                Err(err) => warn!(error = %err, "sweep: expiry pass failed"),
            }

            match cache.enforce_budget().await {
                Ok(0) => {}
                Ok(removed) => info!("sweep: budget eviction removed {} entries", removed),
                Err(err) => warn!(error = %err, "sweep: budget pass failed"),
            }
        }
    })
}
