//! API Handlers
//!
//! HTTP request handlers for the cache diagnostics endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::StatsSnapshot;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::logo::LogoCache;
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetEntryRequest, SetResponse,
    StatsResponse,
};
use crate::persist::{DurableStore, FileStore};
use crate::registry::{cache_key, CacheRegistry, EntityKind};
use crate::session::SessionStore;

/// Application state shared across all handlers.
///
/// Built once by the composition root; every cache handle inside is a cheap
/// clone of the same underlying instance.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Per-entity caches
    pub registry: CacheRegistry,
    /// Persisted logo URL cache
    pub logos: LogoCache,
    /// Per-game host state
    pub sessions: SessionStore<Value>,
}

impl AppState {
    pub fn new(registry: CacheRegistry, logos: LogoCache, sessions: SessionStore<Value>) -> Self {
        Self {
            registry,
            logos,
            sessions,
        }
    }

    /// Creates caches from configuration, persisting to `config.data_dir`.
    pub fn from_config(config: &Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store: Arc<dyn DurableStore> = Arc::new(FileStore::new(&config.data_dir));
        Self::with_store(config, clock, store)
    }

    /// Creates caches from configuration over an explicit store and clock.
    pub fn with_store(config: &Config, clock: Arc<dyn Clock>, store: Arc<dyn DurableStore>) -> Self {
        let registry = CacheRegistry::new(config.entity_cache(), clock.clone());
        let logos = LogoCache::open(store.clone(), config.persistent_cache(), clock.clone());
        let sessions = SessionStore::with_ttl(
            store,
            clock,
            Duration::from_secs(config.persistent_ttl),
        );
        Self::new(registry, logos, sessions)
    }

    /// Snapshots for every cache, logos included.
    pub async fn all_stats(&self) -> BTreeMap<String, StatsSnapshot> {
        let mut caches: BTreeMap<String, StatsSnapshot> = self
            .registry
            .stats()
            .await
            .into_iter()
            .map(|(name, stats)| (name.to_string(), stats))
            .collect();
        caches.insert(self.logos.shared().name().to_string(), self.logos.stats().await);
        caches
    }
}

/// Handler for PUT /caches/:kind
///
/// Stores a JSON value under `<kind>:<id>`.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(req): Json<SetEntryRequest>,
) -> Result<Json<SetResponse>> {
    let kind: EntityKind = kind.parse()?;
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = cache_key(kind, &req.id);
    state
        .registry
        .get(kind)
        .store(key.clone(), req.value, req.ttl.map(Duration::from_secs))
        .await;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /caches/:kind/:id
pub async fn get_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let kind: EntityKind = kind.parse()?;
    let key = cache_key(kind, &id);

    match state.registry.get(kind).get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /caches/:kind/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let kind: EntityKind = kind.parse()?;
    let key = cache_key(kind, &id);

    if state.registry.get(kind).delete(&key).await {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for DELETE /caches/:kind
///
/// Drops every entry and resets the cache's statistics.
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ClearResponse>> {
    let kind: EntityKind = kind.parse()?;
    state.registry.get(kind).clear().await;
    info!(cache = %kind, "Cache cleared via API");

    Ok(Json(ClearResponse::new(kind.as_str())))
}

/// Handler for GET /stats/:kind
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<StatsSnapshot>> {
    let kind: EntityKind = kind.parse()?;
    Ok(Json(state.registry.get(kind).stats().await))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        caches: state.all_stats().await,
    })
}

/// Handler for PUT /sessions/:game_id
///
/// Saves the body as the game's session state.
pub async fn save_session_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(session): Json<Value>,
) -> Result<Json<SetResponse>> {
    if game_id.is_empty() {
        return Err(CacheError::InvalidRequest("Game id cannot be empty".to_string()));
    }
    state.sessions.save(&game_id, &session).await;
    Ok(Json(SetResponse::new(SessionStore::<Value>::slot_for(&game_id))))
}

/// Handler for GET /sessions/:game_id
pub async fn load_session_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GetResponse>> {
    let slot = SessionStore::<Value>::slot_for(&game_id);
    match state.sessions.load(&game_id).await {
        Some(session) => Ok(Json(GetResponse::new(slot, session))),
        None => Err(CacheError::NotFound(slot)),
    }
}

/// Handler for DELETE /sessions/:game_id
pub async fn clear_session_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Json<DeleteResponse> {
    state.sessions.clear(&game_id).await;
    Json(DeleteResponse::new(SessionStore::<Value>::slot_for(&game_id)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
