//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A stored value together with the time it was written and its lifetime.
///
/// Serialized as `{ "value": .., "storedAt": .., "ttl": .. }`, all times in
/// Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Lifetime in milliseconds
    #[serde(rename = "ttl")]
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stored at `now_ms` that lives for `ttl`.
    pub fn new(value: V, now_ms: u64, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: now_ms,
            ttl_ms: duration_ms(ttl),
        }
    }

    /// Timestamp at which the entry stops being live.
    pub fn expires_at(&self) -> u64 {
        self.stored_at.saturating_add(self.ttl_ms)
    }

    // == Liveness ==
    /// An entry is live while `now < stored_at + ttl`.
    ///
    /// At exactly `stored_at + ttl` the entry is already stale.
    pub fn is_live(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at()
    }

    /// Negation of [`CacheEntry::is_live`].
    pub fn is_expired(&self, now_ms: u64) -> bool {
        !self.is_live(now_ms)
    }

    /// Remaining lifetime in milliseconds, `0` once stale.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at().saturating_sub(now_ms)
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
