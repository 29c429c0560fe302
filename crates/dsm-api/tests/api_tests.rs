use axum::http::StatusCode;
use serde_json::Value;

use crate::common::{TestClient, TestStateBuilder};

#[tokio::test]
async fn test_health_check() {
    let client = TestClient::new(TestStateBuilder::new().build_lazy());

    let response = client.get("/health").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert!(body["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_returns_envelope() {
    let client = TestClient::new(TestStateBuilder::new().build_lazy());

    let response = client.get("/does-not-exist").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Route not found");
}

#[tokio::test]
async fn test_unknown_api_route_is_not_found_without_token() {
    let client = TestClient::new(TestStateBuilder::new().build_lazy());

    let response = client.get("/api/v1/unknown").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_generated_and_echoed() {
    let client = TestClient::new(TestStateBuilder::new().build_lazy());

    let response = client.get("/health").await;
    let generated = response.header("x-request-id").expect("request id header");
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-forwarded-for", "127.0.0.1")
        .header("x-request-id", "trace-abc-123")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = client.request(request).await;
    assert_eq!(response.header("x-request-id"), Some("trace-abc-123"));
}

#[tokio::test]
async fn test_security_headers_present() {
    let client = TestClient::new(TestStateBuilder::new().build_lazy());

    let response = client.get("/health").await;

    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(response.header("x-frame-options"), Some("DENY"));
    // Development configuration
    assert!(response.header("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let client = TestClient::new(TestStateBuilder::new().build_lazy());

    let response = client.post_raw("/api/v1/auth/login", "{not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(!response.error().is_empty());
}

#[tokio::test]
async fn test_metrics_not_exposed_without_exporter() {
    let client = TestClient::new(TestStateBuilder::new().build_lazy());

    let response = client.get("/metrics").await;

    response.assert_status(StatusCode::NOT_FOUND);
}
