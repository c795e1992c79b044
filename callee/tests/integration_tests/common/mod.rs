//! Common test utilities and helpers for integration tests.
//!
//! This module provides the test app setup and HTTP request helpers shared by
//! all callee integration tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use callee::{create_router, AppState, Config};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::testing::TestTelemetry;

/// Creates a test router with default configuration and in-memory telemetry.
pub fn test_app() -> (Router, TestTelemetry) {
    test_app_with(&Config::default())
}

/// Creates a test router with the given configuration and in-memory telemetry.
pub fn test_app_with(config: &Config) -> (Router, TestTelemetry) {
    let telemetry = TestTelemetry::new("callee");
    let router = create_router(AppState::new(config, telemetry.telemetry()));
    (router, telemetry)
}

/// Helper to make a GET request with extra headers, returning the raw body.
pub async fn get_text_with_headers(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, String) {
    let mut request = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = tower::ServiceExt::oneshot(app, request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}

/// Helper to make a GET request, returning the raw body.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    get_text_with_headers(app, uri, &[]).await
}

/// Helper to make a GET request, returning the parsed JSON body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get_text(app, uri).await;
    let json: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    (status, json)
}
