//! Cache-Aside Module
//!
//! Wraps an expensive fallible fetch with a cache lookup.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::cache::SharedCache;

// == With Cache ==
/// Returns the live value for `key`, or runs `producer`, caches its output
/// under `key` and returns it.
///
/// - A hit never runs `producer`.
/// - A producer error is returned unchanged and nothing is cached.
/// - Concurrent misses on the same key each run their own producer; the last
///   one to finish wins. Use [`with_cache_coalesced`] to share one call.
///
/// `ttl` of `None` uses the cache's default lifetime.
pub async fn with_cache<V, E, F, Fut>(
    cache: &SharedCache<V>,
    key: &str,
    ttl: Option<Duration>,
    producer: F,
) -> Result<V, E>
where
    V: Clone + Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    if let Some(value) = cache.get(key).await {
        return Ok(value);
    }

    // No lock is held while the producer runs
    let value = producer().await?;
    cache.store(key, value.clone(), ttl).await;
    Ok(value)
}

// == With Cache (Coalesced) ==
/// Like [`with_cache`], but concurrent misses on one key share a single
/// producer call.
///
/// The first caller to miss runs its producer; the others wait for that
/// result. If it fails, or its caller is cancelled, the next waiter runs its
/// own producer instead. Failures are never cached.
pub async fn with_cache_coalesced<V, E, F, Fut>(
    cache: &SharedCache<V>,
    key: &str,
    ttl: Option<Duration>,
    producer: F,
) -> Result<V, E>
where
    V: Clone + Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    if let Some(value) = cache.get(key).await {
        return Ok(value);
    }

    let pending = InFlight {
        cache,
        key,
        cell: cache.join_in_flight(key),
    };
    if pending.cell.initialized() {
        debug!(cache = %cache.name(), key, "Joined completed in-flight fetch");
    }

    let value = pending
        .cell
        .get_or_try_init(move || async move {
            let value = producer().await?;
            cache.store(key, value.clone(), ttl).await;
            Ok::<V, E>(value)
        })
        .await?
        .clone();
    Ok(value)
}

/// Unregisters the in-flight cell when the call finishes or is dropped.
struct InFlight<'a, V> {
    cache: &'a SharedCache<V>,
    key: &'a str,
    cell: Arc<OnceCell<V>>,
}

impl<V> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        self.cache.leave_in_flight(self.key, &self.cell);
    }
}
