//! Shared Cache Module
//!
//! Thread-safe handle around a [`Cache`], used by handlers, background tasks
//! and the cache-aside helpers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{OnceCell, RwLock};

use crate::cache::{Cache, StatsSnapshot};
use crate::error::Result;

type InFlightMap<V> = HashMap<String, Arc<OnceCell<V>>>;

// == Shared Cache ==
/// Cloneable handle to one cache instance.
///
/// Each method holds the lock for exactly one cache operation. Nothing that
/// can suspend (producers, network calls) ever runs under it.
#[derive(Debug)]
pub struct SharedCache<V> {
    name: Arc<str>,
    inner: Arc<RwLock<Cache<V>>>,
    /// Pending producer results, keyed like entries
    in_flight: Arc<Mutex<InFlightMap<V>>>,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            inner: self.inner.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<V> SharedCache<V> {
    pub fn new(cache: Cache<V>) -> Self {
        Self {
            name: Arc::from(cache.name()),
            inner: Arc::new(RwLock::new(cache)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a snapshot of the statistics and current size.
    pub async fn stats(&self) -> StatsSnapshot {
        self.inner.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read().await.contains(key)
    }

    /// Returns the pending cell for `key`, creating one if none is in flight.
    pub(crate) fn join_in_flight(&self, key: &str) -> Arc<OnceCell<V>> {
        self.in_flight_map()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Forgets `cell` if it is still the one registered for `key`.
    pub(crate) fn leave_in_flight(&self, key: &str, cell: &Arc<OnceCell<V>>) {
        let mut map = self.in_flight_map();
        if map.get(key).is_some_and(|current| Arc::ptr_eq(current, cell)) {
            map.remove(key);
        }
    }

    #[cfg(test)]
    pub(crate) fn in_flight_len(&self) -> usize {
        self.in_flight_map().len()
    }

    fn in_flight_map(&self) -> MutexGuard<'_, InFlightMap<V>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V: Clone + Serialize> SharedCache<V> {
    pub async fn get(&self, key: &str) -> Option<V> {
        // Write lock: a lookup may evict and always updates stats
        self.inner.write().await.get(key)
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.inner.write().await.set(key, value);
    }

    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.inner.write().await.set_with_ttl(key, value, ttl);
    }

    /// Stores with `ttl` when given, otherwise with the cache default.
    pub async fn store(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let mut cache = self.inner.write().await;
        match ttl {
            Some(ttl) => cache.set_with_ttl(key, value, ttl),
            None => cache.set(key, value),
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.write().await.delete(key)
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn sweep_expired(&self) -> usize {
        self.inner.write().await.sweep_expired()
    }

    pub async fn persist_now(&self) -> Result<()> {
        self.inner.read().await.persist_now()
    }
}
