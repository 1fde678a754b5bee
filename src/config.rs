//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Entry count at which a cache sweeps stale entries before inserting
    pub capacity: usize,
    /// TTL in seconds for the entity caches
    pub default_ttl: u64,
    /// TTL in seconds for caches persisted across restarts
    pub persistent_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds, 0 disables it
    pub cleanup_interval: u64,
    /// Directory holding durable cache snapshots
    pub data_dir: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Soft entry ceiling per cache (default: 1000)
    /// - `DEFAULT_TTL` - Entity cache TTL in seconds (default: 300)
    /// - `PERSISTENT_TTL` - Persisted cache TTL in seconds (default: 86400)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `DATA_DIR` - Snapshot directory (default: ./data)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_or("CACHE_CAPACITY", defaults.capacity),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            persistent_ttl: env_or("PERSISTENT_TTL", defaults.persistent_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    /// Settings for the per-entity caches.
    pub fn entity_cache(&self) -> CacheConfig {
        CacheConfig::new(self.capacity, Duration::from_secs(self.default_ttl))
    }

    /// Settings for caches persisted to `data_dir`.
    pub fn persistent_cache(&self) -> CacheConfig {
        CacheConfig::new(self.capacity, Duration::from_secs(self.persistent_ttl))
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_ttl: 300,
            persistent_ttl: 86_400,
            server_port: 3000,
            cleanup_interval: 60,
            data_dir: PathBuf::from("./data"),
        }
    }
}
