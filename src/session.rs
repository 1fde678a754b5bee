//! Game Session Module
//!
//! Keeps each running game's state in its own durable slot so a host can
//! resume after a restart.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{duration_ms, PERSISTENT_DEFAULT_TTL};
use crate::clock::Clock;
use crate::error::{CacheError, Result};
use crate::persist::DurableStore;

/// Prefix of every session slot name.
pub const SESSION_SLOT_PREFIX: &str = "game_session_";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionSlotRef<'a, S> {
    state: &'a S,
    expires_at: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionSlot<S> {
    state: S,
    expires_at: u64,
}

/// The part of a slot the sweep needs; `state` is never decoded.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionExpiry {
    expires_at: u64,
}

// == Session Store ==
/// Per-game state persisted as `{ "state": .., "expiresAt": .. }`.
///
/// Storage calls run on Tokio's blocking pool. Failures are logged and
/// swallowed so a broken backend never interrupts a running game.
#[derive(Debug)]
pub struct SessionStore<S> {
    store: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    _state: PhantomData<fn() -> S>,
}

impl<S> Clone for SessionStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
            ttl: self.ttl,
            _state: PhantomData,
        }
    }
}

impl<S> SessionStore<S> {
    /// Slot name for a game.
    pub fn slot_for(game_id: &str) -> String {
        format!("{}{}", SESSION_SLOT_PREFIX, game_id)
    }

    /// Removes the saved state for a game.
    pub async fn clear(&self, game_id: &str) {
        let slot = Self::slot_for(game_id);
        if let Err(e) = self.blocking(move |store| store.remove(&slot)).await {
            warn!(game_id, error = %e, "Failed to clear game session");
        }
    }

    /// Removes every expired or unreadable session slot, including those of
    /// games nobody loads again. Returns the number removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let swept = self
            .blocking(move |store| {
                let mut removed = 0;
                for slot in store.slots(SESSION_SLOT_PREFIX)? {
                    let raw = match store.read(&slot) {
                        Ok(Some(raw)) => raw,
                        Ok(None) => continue,
                        Err(e) => {
                            warn!(slot = %slot, error = %e, "Failed to read game session during sweep");
                            continue;
                        }
                    };
                    let live = serde_json::from_str::<SessionExpiry>(&raw)
                        .is_ok_and(|session| now < session.expires_at);
                    if live {
                        continue;
                    }
                    match store.remove(&slot) {
                        Ok(()) => removed += 1,
                        Err(e) => {
                            warn!(slot = %slot, error = %e, "Failed to remove stale game session")
                        }
                    }
                }
                Ok(removed)
            })
            .await;

        match swept {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, "Swept stale game sessions");
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "Failed to sweep game sessions");
                0
            }
        }
    }

    /// Runs `op` against the backend on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn DurableStore) -> Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| CacheError::Internal(e.to_string()))?
    }
}

impl<S: Serialize + DeserializeOwned> SessionStore<S> {
    /// Creates a store whose sessions live for 24 hours.
    pub fn new(store: Arc<dyn DurableStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(store, clock, PERSISTENT_DEFAULT_TTL)
    }

    pub fn with_ttl(store: Arc<dyn DurableStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            _state: PhantomData,
        }
    }

    /// Saves `state` with the store's default lifetime.
    pub async fn save(&self, game_id: &str, state: &S) {
        self.save_with_ttl(game_id, state, self.ttl).await;
    }

    pub async fn save_with_ttl(&self, game_id: &str, state: &S, ttl: Duration) {
        let slot = Self::slot_for(game_id);
        let expires_at = self.clock.now_ms().saturating_add(duration_ms(ttl));

        let data = match serde_json::to_string(&SessionSlotRef { state, expires_at }) {
            Ok(data) => data,
            Err(e) => {
                warn!(game_id, error = %e, "Failed to encode game session");
                return;
            }
        };

        if let Err(e) = self.blocking(move |store| store.write(&slot, &data)).await {
            warn!(game_id, error = %e, "Failed to save game session");
        }
    }

    /// Returns the saved state, or `None` if there is none or it expired.
    ///
    /// Expired and unreadable slots are removed.
    pub async fn load(&self, game_id: &str) -> Option<S> {
        let slot = Self::slot_for(game_id);
        let raw = match self.blocking(move |store| store.read(&slot)).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(game_id, error = %e, "Failed to read game session");
                return None;
            }
        };

        match serde_json::from_str::<SessionSlot<S>>(&raw) {
            Ok(session) if self.clock.now_ms() < session.expires_at => Some(session.state),
            Ok(_) => {
                debug!(game_id, "Game session expired");
                self.clear(game_id).await;
                None
            }
            Err(e) => {
                warn!(game_id, error = %e, "Discarding corrupt game session");
                self.clear(game_id).await;
                None
            }
        }
    }
}
