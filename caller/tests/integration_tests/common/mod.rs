//! Common test utilities and helpers for integration tests.
//!
//! This module provides the test app setup and HTTP request helpers shared by
//! all caller integration tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use caller::{create_router, AppState, Config};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::opentelemetry::trace::{SpanId, TraceId};
use shared::testing::TestTelemetry;

/// Creates a caller router that fetches `downstream_url`, sharing `telemetry`.
pub fn test_app(telemetry: &TestTelemetry, downstream_url: &str) -> Router {
    let config = Config::default().with_downstream_url(downstream_url);
    let state = AppState::new(&config, telemetry.telemetry()).unwrap();
    create_router(state)
}

/// Helper to make a GET request with extra headers.
pub async fn get_with_headers(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut request = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = tower::ServiceExt::oneshot(app, request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    get_with_headers(app, uri, &[]).await
}

/// Splits a `traceparent` header into its trace id and parent span id.
pub fn parse_traceparent(header: &str) -> (TraceId, SpanId) {
    let parts: Vec<&str> = header.split('-').collect();
    assert_eq!(parts.len(), 4, "malformed traceparent {header}");
    (
        TraceId::from_hex(parts[1]).unwrap(),
        SpanId::from_hex(parts[2]).unwrap(),
    )
}
