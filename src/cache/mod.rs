//! Cache Module
//!
//! Provides in-memory TTL caching with lazy and capacity-triggered eviction,
//! per-cache statistics and the cache-aside call pattern.

mod aside;
mod entry;
pub mod eviction;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use aside::{with_cache, with_cache_coalesced};
pub use entry::CacheEntry;
pub(crate) use entry::duration_ms;
pub use shared::SharedCache;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{
    Cache, CacheConfig, DEFAULT_CAPACITY_CEILING, PERSISTENT_DEFAULT_TTL, SERVER_DEFAULT_TTL,
};
