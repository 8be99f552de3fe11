//! HTTP routes exercised end to end through the router

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use fairdice::{
    api::create_app,
    config::{AppConfig, StorageBackend},
    fairness::Commitment,
    game_store::{InMemoryOutcomeStore, OutcomeStore},
    games::registry::SequenceIndexSource,
    Outcome, ServiceBuilder,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn memory_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.game.house_seed = Some("S".to_string());
    config
}

/// App whose rounds always use the generator at `index`
fn app_with(index: usize, store: Arc<dyn OutcomeStore>) -> Router {
    let config = memory_config();
    let service = ServiceBuilder::new(config.clone())
        .with_store(store)
        .with_index_source(Box::new(SequenceIndexSource::new(vec![index])))
        .with_seed_source(Arc::new(|| "C".to_string()))
        .build()
        .unwrap();
    create_app(Arc::new(service), &config.http)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_echoes_request_id() {
    let app = app_with(0, Arc::new(InMemoryOutcomeStore::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_play_and_fetch_round() {
    let app = app_with(2, Arc::new(InMemoryOutcomeStore::new()));

    let (status, played) = send(&app, Method::POST, "/api/play", Some(json!({"player_id": "alice"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(played["player_id"], "alice");
    assert_eq!(played["generator_name"], "commit_reveal");
    assert!(played["disclosure"].as_str().unwrap().starts_with("S:2:"));

    let round_id = played["round_id"].as_str().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/api/rounds/{}", round_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, played);
}

#[tokio::test]
async fn test_play_without_body_is_anonymous() {
    let app = app_with(0, Arc::new(InMemoryOutcomeStore::new()));

    let (status, played) = send(&app, Method::POST, "/api/play", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(played["player_id"], "anonymous");
    assert_eq!(played["generator_name"], "uniform");
    assert!(played.get("disclosure").is_none());

    let (_, played) = send(&app, Method::POST, "/api/play", Some(json!({}))).await;
    assert_eq!(played["player_id"], "anonymous");
}

#[tokio::test]
async fn test_unknown_round_is_404() {
    let app = app_with(0, Arc::new(InMemoryOutcomeStore::new()));

    let (status, body) = send(&app, Method::GET, "/api/rounds/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(!body["request_id"].as_str().unwrap().is_empty());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/verify",
        Some(json!({"round_id": "missing", "client_seed": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_verify_results() {
    let store: Arc<dyn OutcomeStore> = Arc::new(InMemoryOutcomeStore::new());
    let commitment = Commitment::compute("S", "C", 2);
    let matching = Outcome::new(
        "alice".to_string(),
        commitment.value_in_range(0, 1, 6),
        commitment.value_in_range(1, 1, 6),
        "commit_reveal",
        Some(format!("S:2:{}", commitment.to_hex())),
    );
    store.save(&matching).await.unwrap();
    let malformed = Outcome::new(
        "alice".to_string(),
        1,
        2,
        "commit_reveal",
        Some("invalid_format".to_string()),
    );
    store.save(&malformed).await.unwrap();

    let app = app_with(0, store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/verify",
        Some(json!({"round_id": matching.round_id, "client_seed": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"round_id": matching.round_id, "is_valid": true}));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/verify",
        Some(json!({"round_id": matching.round_id, "client_seed": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/verify",
        Some(json!({"round_id": malformed.round_id, "client_seed": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
}

#[tokio::test]
async fn test_bad_verify_body_uses_error_envelope() {
    let app = app_with(0, Arc::new(InMemoryOutcomeStore::new()));

    let (status, body) = send(&app, Method::POST, "/api/verify", Some(json!({"round_id": "r1"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("client_seed"));
    assert!(!body["request_id"].as_str().unwrap().is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/verify")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_uniform_round_not_verifiable() {
    let app = app_with(0, Arc::new(InMemoryOutcomeStore::new()));

    let (_, played) = send(&app, Method::POST, "/api/play", Some(json!({"player_id": "bob"}))).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/verify",
        Some(json!({"round_id": played["round_id"], "client_seed": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"].as_str().unwrap().contains("uniform"));
}

#[tokio::test]
async fn test_history_stats_and_metrics() {
    let app = app_with(0, Arc::new(InMemoryOutcomeStore::new()));
    for _ in 0..3 {
        send(&app, Method::POST, "/api/play", Some(json!({"player_id": "carol"}))).await;
    }
    send(&app, Method::POST, "/api/play", Some(json!({"player_id": "dave"}))).await;

    let (status, body) = send(&app, Method::GET, "/api/players/carol/rounds?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player_id"], "carol");
    assert_eq!(body["rounds"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["limit"], 2);

    let (_, body) = send(&app, Method::GET, "/api/players/carol/rounds?offset=2", None).await;
    assert_eq!(body["rounds"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["limit"], 20);

    let (status, stats) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_rounds"], 4);
    assert_eq!(
        stats["generators"],
        json!(["uniform", "secure_uniform", "commit_reveal"])
    );

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec(),
    )
    .unwrap();
    assert!(text.contains("fairdice_rounds_total{generator=\"uniform\""));
}
