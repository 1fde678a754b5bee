//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with TTL expiration, a
//! capacity-triggered sweep and optional durable snapshots.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{eviction, CacheEntry, CacheStats, StatsSnapshot};
use crate::clock::Clock;
use crate::error::Result;
use crate::persist::Persistence;

/// Default lifetime for server-side caches guarding database reads.
pub const SERVER_DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default lifetime for caches persisted across restarts.
pub const PERSISTENT_DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default soft ceiling on entry count.
pub const DEFAULT_CAPACITY_CEILING: usize = 1000;

// == Cache Config ==
/// Per-cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entry count at which `set` sweeps stale entries before inserting
    pub capacity_ceiling: usize,
    /// Lifetime used by `set`
    pub default_ttl: Duration,
}

impl CacheConfig {
    pub fn new(capacity_ceiling: usize, default_ttl: Duration) -> Self {
        Self {
            capacity_ceiling,
            default_ttl,
        }
    }

    /// Preset for in-process caches in front of the database.
    pub fn server() -> Self {
        Self::new(DEFAULT_CAPACITY_CEILING, SERVER_DEFAULT_TTL)
    }

    /// Preset for caches that outlive the process.
    pub fn persistent() -> Self {
        Self::new(DEFAULT_CAPACITY_CEILING, PERSISTENT_DEFAULT_TTL)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::server()
    }
}

// == Cache ==
/// String-keyed TTL cache.
///
/// Not internally synchronized; wrap it in a [`SharedCache`](crate::cache::SharedCache)
/// to use it from more than one task.
#[derive(Debug)]
pub struct Cache<V> {
    /// Name used in logs and stats output
    name: String,
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    /// Snapshot target, if this cache survives restarts
    persistence: Option<Persistence>,
}

impl<V> Cache<V> {
    // == Constructor ==
    /// Creates an empty, purely in-process cache.
    pub fn new(name: impl Into<String>, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
            stats: CacheStats::new(),
            config,
            clock,
            persistence: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Contains ==
    /// Returns true if `key` holds a live entry. Does not touch statistics.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries.get(key).is_some_and(|entry| entry.is_live(now))
    }

    // == Length ==
    /// Returns the number of entries held, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the statistics and current size.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.entries.len())
    }
}

impl<V: Clone + Serialize> Cache<V> {
    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// A stale entry is removed on the spot and reported as a miss. Lookups
    /// never extend an entry's lifetime.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        let live = match self.entries.get(key) {
            Some(entry) => entry.is_live(now),
            None => {
                self.stats.record_miss();
                debug!(cache = %self.name, key, "Cache miss");
                return None;
            }
        };

        if !live {
            self.entries.remove(key);
            self.stats.record_miss();
            debug!(cache = %self.name, key, "Cache miss (expired)");
            self.persist();
            return None;
        }

        self.stats.record_hit();
        debug!(cache = %self.name, key, "Cache hit");
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value with the cache's default TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let ttl = self.config.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    /// Stores a value with an explicit TTL, overwriting any previous entry.
    ///
    /// When the cache already holds `capacity_ceiling` entries a sweep runs
    /// first. The insert succeeds whether or not the sweep freed anything.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let now = self.clock.now_ms();

        if self.entries.len() >= self.config.capacity_ceiling {
            let removed = eviction::sweep_expired(&mut self.entries, now);
            debug!(
                cache = %self.name,
                removed,
                size = self.entries.len(),
                "Capacity sweep before insert"
            );
        }

        self.entries.insert(key, CacheEntry::new(value, now, ttl));
        self.stats.record_set();
        self.persist();
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.stats.record_delete();
            self.persist();
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Drops every entry and zeroes the statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.reset();
        if let Some(persistence) = &self.persistence {
            persistence.discard();
        }
    }

    // == Sweep Expired ==
    /// Removes all stale entries regardless of access.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let removed = eviction::sweep_expired(&mut self.entries, self.clock.now_ms());
        if removed > 0 {
            self.persist();
        }
        removed
    }

    // == Persist Now ==
    /// Writes the current entries to durable storage synchronously.
    ///
    /// A no-op for caches without persistence.
    pub fn persist_now(&self) -> Result<()> {
        match &self.persistence {
            Some(persistence) => persistence.save_now(&self.entries),
            None => Ok(()),
        }
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.save(&self.entries);
        }
    }
}

impl<V: Clone + Serialize + DeserializeOwned> Cache<V> {
    // == Persistent Constructor ==
    /// Creates a cache backed by a durable slot, restoring whatever the slot
    /// holds and dropping entries that expired while the process was down.
    pub fn persistent(
        name: impl Into<String>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
        persistence: Persistence,
    ) -> Self {
        let slot = persistence.slot().to_string();
        let mut entries = persistence.load::<V>();
        let restored = entries.len();
        let dropped = eviction::sweep_expired(&mut entries, clock.now_ms());

        let cache = Self {
            name: name.into(),
            entries,
            stats: CacheStats::new(),
            config,
            clock,
            persistence: Some(persistence),
        };

        info!(
            cache = %cache.name,
            slot = %slot,
            restored,
            dropped,
            "Cache restored from durable storage"
        );
        if dropped > 0 {
            cache.persist();
        }
        cache
    }
}
