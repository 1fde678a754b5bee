//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use trivia_cache::clock::ManualClock;
use trivia_cache::persist::MemoryStore;
use trivia_cache::{api::create_router, AppState, Config};

// == Helper Functions ==

fn create_test_app() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let state = AppState::with_store(
        &Config::default(),
        clock.clone(),
        Arc::new(MemoryStore::new()),
    );
    (create_router(state), clock)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let (app, _) = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/caches/game",
        Some(json!({"id": "42", "value": {"score": 10}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "game:42");
    assert!(json["message"].as_str().unwrap().contains("game:42"));
}

#[tokio::test]
async fn test_set_endpoint_with_ttl() {
    let (app, _) = create_test_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/caches/question",
        Some(json!({"id": "7", "value": "Capital of Peru?", "ttl": 60})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let (app, _) = create_test_app();

    send(
        &app,
        "PUT",
        "/caches/player",
        Some(json!({"id": "ada", "value": {"name": "Ada", "points": 3}})),
    )
    .await;

    let (status, json) = send(&app, "GET", "/caches/player/ada", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "player:ada");
    assert_eq!(json["value"]["points"], 3);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "GET", "/caches/game/missing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("game:missing"));
}

#[tokio::test]
async fn test_kinds_do_not_share_keys() {
    let (app, _) = create_test_app();

    send(&app, "PUT", "/caches/game", Some(json!({"id": "1", "value": "g"}))).await;

    let (status, _) = send(&app, "GET", "/caches/question/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let (app, _) = create_test_app();

    send(&app, "PUT", "/caches/game", Some(json!({"id": "1", "value": 1}))).await;

    let (status, json) = send(&app, "DELETE", "/caches/game/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("deleted"));

    let (status, _) = send(&app, "GET", "/caches/game/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_not_found() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "DELETE", "/caches/game/nothing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_clear_endpoint() {
    let (app, _) = create_test_app();

    send(&app, "PUT", "/caches/leaderboard", Some(json!({"id": "weekly", "value": []}))).await;
    send(&app, "GET", "/caches/leaderboard/weekly", None).await;

    let (status, _) = send(&app, "DELETE", "/caches/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = send(&app, "GET", "/stats/leaderboard", None).await;
    assert_eq!(stats["size"], 0);
    assert_eq!(stats["hits"], 0);
    assert_eq!(stats["sets"], 0);
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, _) = create_test_app();

    send(&app, "PUT", "/caches/game", Some(json!({"id": "1", "value": 1}))).await;
    send(&app, "GET", "/caches/game/1", None).await; // hit
    send(&app, "GET", "/caches/game/2", None).await; // miss
    send(&app, "DELETE", "/caches/game/1", None).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);

    let game = &json["caches"]["game"];
    assert_eq!(game["hits"], 1);
    assert_eq!(game["misses"], 1);
    assert_eq!(game["sets"], 1);
    assert_eq!(game["deletes"], 1);
    assert_eq!(game["size"], 0);
    assert_eq!(game["hitRate"], 0.5);
    assert!(json["caches"]["logos"].is_object());
}

#[tokio::test]
async fn test_stats_empty_cache_hit_rate_is_zero() {
    let (app, _) = create_test_app();

    let (_, json) = send(&app, "GET", "/stats/question", None).await;

    assert_eq!(json["hitRate"], 0.0);
}

// == Session Endpoint Tests ==

#[tokio::test]
async fn test_session_roundtrip_and_expiry() {
    let (app, clock) = create_test_app();

    let (status, _) = send(&app, "PUT", "/sessions/42", Some(json!({"round": 4}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "GET", "/sessions/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"]["round"], 4);

    clock.advance(Duration::from_secs(86_400));

    let (status, _) = send(&app, "GET", "/sessions/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Error Handling Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/caches/game")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_empty_id_request() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "PUT", "/caches/game", Some(json!({"id": "", "value": 1}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_unknown_cache() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "PUT", "/caches/unicorn", Some(json!({"id": "1", "value": 1}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("unicorn"));
}

// == TTL Tests ==

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let (app, clock) = create_test_app();

    send(
        &app,
        "PUT",
        "/caches/game",
        Some(json!({"id": "short", "value": "v", "ttl": 1})),
    )
    .await;

    let (status, _) = send(&app, "GET", "/caches/game/short", None).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::from_millis(1001));

    let (status, _) = send(&app, "GET", "/caches/game/short", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, stats) = send(&app, "GET", "/stats/game", None).await;
    assert_eq!(stats["size"], 0);
}
