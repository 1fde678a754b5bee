//! Integration Tests for the cache core
//!
//! End-to-end scenarios over the public library API: expiry, cache-aside,
//! and restart survival through a file-backed store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use trivia_cache::cache::{Cache, CacheConfig, SharedCache};
use trivia_cache::clock::ManualClock;
use trivia_cache::logo::LogoCache;
use trivia_cache::persist::{FileStore, Persistence};
use trivia_cache::session::SessionStore;
use trivia_cache::{cache_key, with_cache, EntityKind};

#[test]
fn test_game_entry_lifecycle() {
    let clock = Arc::new(ManualClock::new(5_000));
    let mut cache = Cache::new("games", CacheConfig::server(), clock.clone());

    cache.set_with_ttl("game:42", json!({"score": 10}), Duration::from_millis(1000));
    assert_eq!(cache.get("game:42"), Some(json!({"score": 10})));
    assert_eq!(cache.stats().hits, 1);

    clock.advance(Duration::from_millis(1001));

    assert_eq!(cache.get("game:42"), None);
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(cache.len(), 0);
}

#[tokio::test]
async fn test_cache_aside_in_front_of_slow_lookup() {
    let clock = Arc::new(ManualClock::new(0));
    let questions = SharedCache::new(Cache::new("questions", CacheConfig::server(), clock.clone()));
    let lookups = AtomicUsize::new(0);
    let key = cache_key(EntityKind::Question, 9);

    for _ in 0..3 {
        let question: Result<_, std::io::Error> = with_cache(&questions, &key, None, || async {
            lookups.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(json!({"text": "Largest planet?", "answer": "Jupiter"}))
        })
        .await;
        assert_eq!(question.unwrap()["answer"], "Jupiter");
    }
    assert_eq!(lookups.load(Ordering::SeqCst), 1);

    // Past the 5 minute default the next call fetches again
    clock.advance(Duration::from_secs(300));
    let refetched: Result<_, std::io::Error> = with_cache(&questions, &key, None, || async {
        lookups.fetch_add(1, Ordering::SeqCst);
        Ok(json!({}))
    })
    .await;
    assert!(refetched.is_ok());
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn test_file_backed_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(0));

    {
        let store = Arc::new(FileStore::new(dir.path()));
        let mut cache: Cache<String> = Cache::persistent(
            "logos",
            CacheConfig::persistent(),
            clock.clone(),
            Persistence::new(store, "logo_cache"),
        );
        cache.set("teams/red.png", "https://cdn.example/red.png".to_string());
        cache.set_with_ttl(
            "teams/old.png",
            "https://cdn.example/old.png".to_string(),
            Duration::from_secs(60),
        );
    }

    clock.advance(Duration::from_secs(120));

    let store = Arc::new(FileStore::new(dir.path()));
    let mut cache: Cache<String> = Cache::persistent(
        "logos",
        CacheConfig::persistent(),
        clock.clone(),
        Persistence::new(store, "logo_cache"),
    );
    assert_eq!(cache.len(), 1);
    assert_eq!(
        cache.get("teams/red.png").as_deref(),
        Some("https://cdn.example/red.png")
    );
}

#[test]
fn test_corrupt_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("logo_cache.json"), "garbage").unwrap();

    let logos = LogoCache::open(
        Arc::new(FileStore::new(dir.path())),
        CacheConfig::persistent(),
        Arc::new(ManualClock::new(0)),
    );

    let size = tokio_test::block_on(async { logos.stats().await.size });
    assert_eq!(size, 0);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(0));

    let sessions: SessionStore<serde_json::Value> =
        SessionStore::new(Arc::new(FileStore::new(dir.path())), clock.clone());
    sessions
        .save("7", &json!({"round": 5, "teams": ["red", "blue"]}))
        .await;
    drop(sessions);

    let sessions: SessionStore<serde_json::Value> =
        SessionStore::new(Arc::new(FileStore::new(dir.path())), clock);
    assert_eq!(sessions.load("7").await.unwrap()["round"], 5);
}

#[tokio::test]
async fn test_file_sessions_with_similar_ids_stay_separate() {
    let dir = tempfile::tempdir().unwrap();
    let sessions: SessionStore<serde_json::Value> = SessionStore::new(
        Arc::new(FileStore::new(dir.path())),
        Arc::new(ManualClock::new(0)),
    );

    sessions.save("a:b", &json!({"game": "a:b"})).await;
    sessions.save("a_b", &json!({"game": "a_b"})).await;
    sessions.save("a/b", &json!({"game": "a/b"})).await;

    assert_eq!(sessions.load("a:b").await, Some(json!({"game": "a:b"})));
    assert_eq!(sessions.load("a_b").await, Some(json!({"game": "a_b"})));
    assert_eq!(sessions.load("a/b").await, Some(json!({"game": "a/b"})));
}
