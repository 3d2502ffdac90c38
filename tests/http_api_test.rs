//! Tests for the JSON API.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use skillfive::{AppState, Difficulty, MatchService, MemoryStore, RoomRegistry, RoomSettings, router};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let registry = RoomRegistry::new(Arc::new(MemoryStore::new()), RoomSettings::default());
    router(AppState::new(MatchService::new(registry, Difficulty::Easy), 16))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_create_and_fetch_match() {
    let app = app();
    let (status, created) = send(
        &app,
        post_json(
            "/api/matches",
            json!({ "mode": "skill", "matchType": "ai", "player1": "alice" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "in-progress");
    assert_eq!(created["you"], 1);
    assert_eq!(created["player1"]["skills"].as_array().unwrap().len(), 3);
    assert_eq!(created["player2"]["identity"], "ai");

    let id = created["matchId"].as_str().unwrap();
    let (status, fetched) = send(&app, get(&format!("/api/matches/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["matchId"], id);
    assert_eq!(fetched["you"], Value::Null);
    assert!(fetched["player1"]["skills"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_match_is_404() {
    let app = app();
    let (status, body) = send(&app, get("/api/matches/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "GameNotFound");
}

#[tokio::test]
async fn test_empty_history() {
    let app = app();
    let (status, body) = send(&app, get("/api/records/alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
