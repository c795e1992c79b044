//! Integration tests for the health check and root endpoints.

use axum::http::StatusCode;
use serde_json::json;
use shared::testing::TestTelemetry;

use super::common::{get, test_app};

const UNUSED_DOWNSTREAM: &str = "http://127.0.0.1:1/slow";

#[tokio::test]
async fn test_health_check() {
    let telemetry = TestTelemetry::new("caller");
    let app = test_app(&telemetry, UNUSED_DOWNSTREAM);

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"status": "OK"}));
}

#[tokio::test]
async fn test_health_check_exports_no_span() {
    let telemetry = TestTelemetry::new("caller");
    let _guard = telemetry.set_default();
    let app = test_app(&telemetry, UNUSED_DOWNSTREAM);

    get(app, "/health").await;

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(telemetry.finished_spans().is_empty());
}

#[tokio::test]
async fn test_root_is_traced() {
    let telemetry = TestTelemetry::new("caller");
    let _guard = telemetry.set_default();
    let app = test_app(&telemetry, UNUSED_DOWNSTREAM);

    let (status, response) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"message": "Hello from caller"}));

    let server = telemetry.wait_for_span("GET /").await.unwrap();
    let handler = telemetry.wait_for_span("root").await.unwrap();
    assert_eq!(handler.parent_span_id, server.span_context.span_id());
}
