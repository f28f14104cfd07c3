//! fetchbox - A time-boxed fetch cache service
//!
//! Caching fetch proxy for a rate-limited upstream JSON API: fresh results
//! are served from the cache, misses are fetched once and memoized.

mod api;
mod cache;
mod config;
mod error;
mod models;
mod producer;
mod settings;
mod store;
mod tasks;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use settings::Settings;
use store::MemoryStore;
use tasks::spawn_sweep_task;

/// Main entry point for the fetchbox service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Migrate persisted settings (fill missing fields with defaults)
/// 4. Create the fetch cache over the shared store
/// 5. Start the background expiry sweep task
/// 6. Create Axum router with all endpoints
/// 7. Start HTTP server on configured port
/// 8. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetchbox=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fetchbox");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, sweep_interval={}s",
        config.server_port, config.sweep_interval
    );

    // Migrate persisted settings once at startup
    let store = Arc::new(MemoryStore::new());
    let settings = match Settings::migrate(store.as_ref()).await {
        Ok(settings) => settings,
        Err(err) => {
            warn!(error = %err, "settings migration failed, using defaults");
            Settings::default()
        }
    };
    info!(
        "Settings: default_ttl={}s, budget={} bytes, evict_fraction={}, producer_timeout={}s",
        settings.default_ttl_secs,
        settings.max_cache_bytes,
        settings.evict_fraction,
        settings.producer_timeout_secs
    );

    // Create application state with the fetch cache
    let state = AppState::new(store, settings);
    info!("Fetch cache initialized");

    // Start background sweep task
    let sweep_handle = spawn_sweep_task(state.cache.clone(), config.sweep_interval);
    info!("Background sweep task started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .unwrap();

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the sweep task
    sweep_handle.abort();
    warn!("Sweep task aborted");
}
