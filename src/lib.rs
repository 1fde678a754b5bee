//! Trivia Cache - TTL cache-aside layer for the trivia game service
//!
//! Provides string-keyed TTL caches with hit/miss statistics, a cache-aside
//! wrapper for expensive fetches, durable snapshots for caches that must
//! survive a restart, and per-game session persistence.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod logo;
pub mod models;
pub mod persist;
pub mod registry;
pub mod session;
pub mod tasks;

pub use api::AppState;
pub use cache::{with_cache, with_cache_coalesced, Cache, CacheConfig, SharedCache};
pub use config::Config;
pub use registry::{cache_key, CacheRegistry, EntityKind};
pub use tasks::spawn_cleanup_task;
