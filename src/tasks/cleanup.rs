//! Sweep Task
//!
//! Background task that periodically removes expired entries from every cache
//! and expired game sessions from durable storage.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::AppState;

/// Spawns a background task that periodically sweeps every cache and the
/// session slots in `state`.
///
/// Lazy eviction and the capacity sweep already bound growth; this task only
/// keeps memory tidy for keys that are written once and never read again.
/// Session slots have no such bound, so games that are never resumed are
/// only cleaned up here.
///
/// # Arguments
/// * `state` - Application state holding the caches and session store
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let state = AppState::from_config(&config);
/// let cleanup_handle = spawn_cleanup_task(state.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(state: AppState, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = state.registry.sweep_all().await
                + state.logos.shared().sweep_expired().await;
            let sessions = state.sessions.sweep_expired().await;
            if sessions > 0 {
                info!("Session sweep: removed {} stale game sessions", sessions);
            }

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
