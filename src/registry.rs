//! Named Cache Registry
//!
//! One independently configured cache per entity kind, built once by the
//! composition root and handed to whoever needs it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::cache::{Cache, CacheConfig, SharedCache, StatsSnapshot};
use crate::clock::Clock;
use crate::error::CacheError;

// == Entity Kind ==
/// Kinds of record cached in front of the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Game,
    Question,
    Player,
    Leaderboard,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Game,
        EntityKind::Question,
        EntityKind::Player,
        EntityKind::Leaderboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Game => "game",
            EntityKind::Question => "question",
            EntityKind::Player => "player",
            EntityKind::Leaderboard => "leaderboard",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CacheError::UnknownCache(s.to_string()))
    }
}

// == Key Naming ==
/// Builds the cache key for one record: `"<kind>:<id>"`.
pub fn cache_key(kind: EntityKind, id: impl fmt::Display) -> String {
    format!("{}:{}", kind.as_str(), id)
}

// == Cache Registry ==
/// The set of entity caches for one process.
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    caches: Arc<BTreeMap<EntityKind, SharedCache<Value>>>,
}

impl CacheRegistry {
    /// Creates one empty cache per entity kind, all sharing `config` and `clock`.
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let caches: BTreeMap<EntityKind, SharedCache<Value>> = EntityKind::ALL
            .into_iter()
            .map(|kind| {
                let cache = Cache::new(kind.as_str(), config, clock.clone());
                (kind, SharedCache::new(cache))
            })
            .collect();

        Self {
            caches: Arc::new(caches),
        }
    }

    /// Returns the cache for `kind`.
    pub fn get(&self, kind: EntityKind) -> &SharedCache<Value> {
        // Every kind is populated in `new`
        &self.caches[&kind]
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &SharedCache<Value>)> {
        self.caches.iter().map(|(kind, cache)| (*kind, cache))
    }

    /// Statistics for every cache, keyed by kind name.
    pub async fn stats(&self) -> BTreeMap<&'static str, StatsSnapshot> {
        let mut all = BTreeMap::new();
        for (kind, cache) in self.iter() {
            all.insert(kind.as_str(), cache.stats().await);
        }
        all
    }

    /// Runs a proactive sweep on every cache. Returns the total removed.
    pub async fn sweep_all(&self) -> usize {
        let mut removed = 0;
        for (_, cache) in self.iter() {
            removed += cache.sweep_expired().await;
        }
        removed
    }
}
