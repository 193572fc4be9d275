//! Handler-level tests over the full router with an in-memory engine.

#![allow(clippy::unwrap_used)] // Test code

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use janseva_core::environment::Clock;
use janseva_core::status::TokenStatus;
use janseva_core::types::{CitizenId, OfficialId, Token};
use janseva_engine::{EngineConfig, QueueEngine};
use janseva_testing::{InMemoryTokenStore, RecordingNotifier, StaticCatalog, test_clock};
use janseva_web::{AppState, build_router};
use serde_json::{Value, json};
use std::sync::Arc;

fn server() -> TestServer {
    let engine = QueueEngine::new(
        Arc::new(InMemoryTokenStore::new()),
        Arc::new(RecordingNotifier::new()),
        Arc::new(StaticCatalog::rto_pune()),
        Arc::new(test_clock()),
        EngineConfig::default(),
    );
    TestServer::new(build_router(AppState::new(engine))).unwrap()
}

fn citizen_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-citizen-id"),
        HeaderValue::from_str(&CitizenId::new().to_string()).unwrap(),
    )
}

fn official_headers(office: &str) -> [(HeaderName, HeaderValue); 2] {
    [
        (
            HeaderName::from_static("x-official-id"),
            HeaderValue::from_str(&OfficialId::new().to_string()).unwrap(),
        ),
        (
            HeaderName::from_static("x-official-office"),
            HeaderValue::from_str(office).unwrap(),
        ),
    ]
}

fn booking_body() -> Value {
    json!({
        "office_id": "rto-pune",
        "service_id": "learning-licence",
        "appointment_date": test_clock().today(),
        "appointment_time": "09:00",
    })
}

#[tokio::test]
async fn booking_returns_created_token() {
    let server = server();
    let (name, value) = citizen_header();

    let response = server
        .post("/api/tokens")
        .add_header(name, value)
        .json(&booking_body())
        .await;

    response.assert_status(StatusCode::CREATED);
    let token: Token = response.json();
    assert_eq!(token.status, TokenStatus::Waiting);
    assert_eq!(token.position_in_queue, Some(1));
    assert_eq!(token.office_name, "RTO Pune");
}

#[tokio::test]
async fn booking_without_identity_is_unauthorized() {
    let server = server();
    let response = server.post("/api/tokens").json(&booking_body()).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_past_date_is_unprocessable() {
    let server = server();
    let (name, value) = citizen_header();
    let mut body = booking_body();
    body["appointment_date"] = json!("2020-01-01");

    let response = server
        .post("/api/tokens")
        .add_header(name, value)
        .json(&body)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = response.json();
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn cancel_then_cancel_again_conflicts() {
    let server = server();
    let (name, value) = citizen_header();

    let token: Token = server
        .post("/api/tokens")
        .add_header(name.clone(), value.clone())
        .json(&booking_body())
        .await
        .json();

    let cancel_path = format!("/api/tokens/{}/cancel", token.id);
    server
        .post(&cancel_path)
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let replay = server.post(&cancel_path).add_header(name, value).await;
    replay.assert_status(StatusCode::CONFLICT);
    let error: Value = replay.json();
    assert_eq!(error["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn call_next_on_empty_queue_is_ok_with_null_token() {
    let server = server();
    let [h1, h2] = official_headers("rto-pune");

    let response = server
        .post("/api/offices/rto-pune/call-next")
        .add_header(h1.0, h1.1)
        .add_header(h2.0, h2.1)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["token"], Value::Null);
}

#[tokio::test]
async fn foreign_official_cannot_read_queue() {
    let server = server();
    let [h1, h2] = official_headers("rto-mumbai");

    let response = server
        .get("/api/offices/rto-pune/queue")
        .add_header(h1.0, h1.1)
        .add_header(h2.0, h2.1)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn full_counter_flow_over_http() {
    let server = server();
    let (citizen_name, citizen_value) = citizen_header();
    let [h1, h2] = official_headers("rto-pune");

    let token: Token = server
        .post("/api/tokens")
        .add_header(citizen_name, citizen_value)
        .json(&booking_body())
        .await
        .json();

    let response = server
        .post("/api/offices/rto-pune/call-next")
        .add_header(h1.0.clone(), h1.1.clone())
        .add_header(h2.0.clone(), h2.1.clone())
        .await;
    let body: Value = response.json();
    assert_eq!(body["token"]["id"], json!(token.id));
    assert_eq!(body["token"]["status"], "serving");

    server
        .post(&format!("/api/tokens/{}/status", token.id))
        .add_header(h1.0.clone(), h1.1.clone())
        .add_header(h2.0.clone(), h2.1.clone())
        .json(&json!({"status": "completed"}))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stats: Value = server
        .get("/api/offices/rto-pune/stats")
        .add_header(h1.0, h1.1)
        .add_header(h2.0, h2.1)
        .await
        .json();
    assert_eq!(stats["served"], 1);
    assert_eq!(stats["waiting"], 0);
}

#[tokio::test]
async fn health_endpoints_answer() {
    let server = server();
    server.get("/health").await.assert_status_ok();
    server.get("/ready").await.assert_status_ok();
}
