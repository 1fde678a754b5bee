//! Logo Cache Module
//!
//! Resolved logo download URLs, persisted so a restart does not refetch them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{with_cache, Cache, CacheConfig, SharedCache, StatsSnapshot};
use crate::clock::Clock;
use crate::persist::{DurableStore, Persistence};

/// Durable slot holding the logo cache snapshot.
pub const LOGO_CACHE_SLOT: &str = "logo_cache";

// == Logo Cache ==
/// Maps a logo storage path to its resolved download URL.
#[derive(Debug, Clone)]
pub struct LogoCache {
    cache: SharedCache<String>,
}

impl LogoCache {
    /// Restores the logo cache from `store`, dropping expired URLs.
    pub fn open(store: Arc<dyn DurableStore>, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let persistence = Persistence::new(store, LOGO_CACHE_SLOT);
        let cache = Cache::persistent("logos", config, clock, persistence);
        Self {
            cache: SharedCache::new(cache),
        }
    }

    pub async fn get(&self, path: &str) -> Option<String> {
        self.cache.get(path).await
    }

    pub async fn set(&self, path: &str, url: impl Into<String>) {
        self.cache.set(path, url.into()).await;
    }

    pub async fn set_with_ttl(&self, path: &str, url: impl Into<String>, ttl: Duration) {
        self.cache.set_with_ttl(path, url.into(), ttl).await;
    }

    pub async fn remove(&self, path: &str) -> bool {
        self.cache.delete(path).await
    }

    /// Returns the cached URL for `path`, or resolves and caches it.
    pub async fn resolve<E, F, Fut>(&self, path: &str, resolver: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        with_cache(&self.cache, path, None, resolver).await
    }

    pub async fn stats(&self) -> StatsSnapshot {
        self.cache.stats().await
    }

    /// The underlying cache, for sweeps and flushes.
    pub fn shared(&self) -> &SharedCache<String> {
        &self.cache
    }
}
