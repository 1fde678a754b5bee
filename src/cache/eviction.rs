//! Eviction Module
//!
//! Proactive removal of stale entries. Lazy eviction lives in `Cache::get`.

use std::collections::HashMap;

use crate::cache::CacheEntry;

// == Sweep Expired ==
/// Removes every entry that is no longer live at `now_ms`.
///
/// Returns the number of entries removed.
pub fn sweep_expired<V>(entries: &mut HashMap<String, CacheEntry<V>>, now_ms: u64) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.is_live(now_ms));
    before - entries.len()
}
