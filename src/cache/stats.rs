//! Cache Statistics Module
//!
//! Tracks hits, misses, sets and deletes for a single cache.

use serde::Serialize;

// == Cache Stats ==
/// Lifetime counters for one cache. Reset only by `Cache::clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing or found a stale entry
    pub misses: u64,
    /// Successful inserts and overwrites
    pub sets: u64,
    /// Explicit deletes that actually removed an entry
    pub deletes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Snapshot ==
    /// Freezes the counters together with the current entry count.
    pub fn snapshot(&self, size: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            sets: self.sets,
            deletes: self.deletes,
            size,
            hit_rate: self.hit_rate(),
        }
    }
}

// == Stats Snapshot ==
/// Read-only view of a cache's statistics, suitable for logging and `/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    /// Number of entries held at snapshot time (live or not yet swept)
    pub size: usize,
    pub hit_rate: f64,
}
