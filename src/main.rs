//! Trivia Cache - diagnostics server for the trivia game caches
//!
//! Hosts the named entity caches and the persisted logo cache behind a small
//! HTTP API.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_cache::api::create_router;
use trivia_cache::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the trivia cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache registry and restore the logo cache from disk
/// 4. Start background sweep task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM, stop the sweep and flush the logo cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trivia_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Trivia Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, default_ttl={}s, persistent_ttl={}s, port={}, cleanup_interval={}s, data_dir={}",
        config.capacity,
        config.default_ttl,
        config.persistent_ttl,
        config.server_port,
        config.cleanup_interval,
        config.data_dir.display()
    );

    let state = AppState::from_config(&config);
    info!("Cache registry initialized");

    let cleanup_handle = if config.cleanup_interval > 0 {
        info!("Background sweep task started");
        Some(spawn_cleanup_task(state.clone(), config.cleanup_interval))
    } else {
        info!("Background sweep disabled");
        None
    };

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }

    // Background snapshot writes may still be queued; write the final state directly
    if let Err(e) = state.logos.shared().persist_now().await {
        warn!(error = %e, "Failed to flush logo cache on shutdown");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
}
