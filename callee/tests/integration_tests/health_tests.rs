//! Integration tests for the health check and root endpoints.

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _telemetry) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_health_check_exports_nothing() {
    let (app, telemetry) = test_app();
    let _guard = telemetry.set_default();

    let (status, _) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(telemetry.finished_spans().is_empty());
    assert!(telemetry.emitted_logs().is_empty());
}

#[tokio::test]
async fn test_root_is_traced() {
    let (app, telemetry) = test_app();
    let _guard = telemetry.set_default();

    let (status, response) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["message"], "Hello from callee");

    let server = telemetry.wait_for_span("GET /").await.unwrap();
    let handler = telemetry.wait_for_span("root").await.unwrap();
    assert_eq!(handler.parent_span_id, server.span_context.span_id());
    assert_eq!(
        handler.span_context.trace_id(),
        server.span_context.trace_id()
    );
}

#[tokio::test]
async fn test_requests_are_metered() {
    let (app, telemetry) = test_app();
    let _guard = telemetry.set_default();

    get(app, "/").await;

    assert!(telemetry.has_metrics());
}
