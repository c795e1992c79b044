//! Integration tests for `/slow`.

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use callee::config::DelayConfig;
use callee::{Config, SlowResponse};
use shared::opentelemetry::trace::Status;
use shared::testing::body_text;

use super::common::{get_text, test_app_with};

fn config_with_delay(min_secs: f64, max_secs: f64) -> Config {
    Config {
        delay: DelayConfig { min_secs, max_secs },
        ..Config::default()
    }
}

#[tokio::test]
async fn test_reported_delay_is_within_bounds() {
    let (app, _telemetry) = test_app_with(&config_with_delay(0.01, 0.05));

    for _ in 0..10 {
        let (status, body) = get_text(app.clone(), "/slow").await;
        assert_eq!(status, StatusCode::OK);

        let response: SlowResponse = serde_json::from_str(&body).unwrap();
        assert!(
            (0.01..=0.05).contains(&response.delay_seconds),
            "delay {}",
            response.delay_seconds
        );
        assert_eq!(
            response.message,
            format!("Slow response after {:.2} seconds", response.delay_seconds)
        );
    }
}

#[tokio::test]
async fn test_elapsed_time_covers_reported_delay() {
    let (app, _telemetry) = test_app_with(&config_with_delay(0.1, 0.2));

    let started = Instant::now();
    let (_, body) = get_text(app, "/slow").await;
    let elapsed = started.elapsed().as_secs_f64();

    let response: SlowResponse = serde_json::from_str(&body).unwrap();
    assert!(
        elapsed >= response.delay_seconds,
        "elapsed {elapsed} < delay {}",
        response.delay_seconds
    );
}

#[tokio::test]
async fn test_default_bounds() {
    let (app, _telemetry) = test_app_with(&Config::default());

    let (_, body) = get_text(app, "/slow").await;

    let response: SlowResponse = serde_json::from_str(&body).unwrap();
    assert!((0.1..=2.0).contains(&response.delay_seconds));
}

#[tokio::test]
async fn test_slow_span_nests_under_server_span() {
    let (app, telemetry) = test_app_with(&config_with_delay(0.01, 0.01));
    let _guard = telemetry.set_default();

    get_text(app, "/slow").await;

    let server = telemetry.wait_for_span("GET /slow").await.unwrap();
    let handler = telemetry.wait_for_span("slow").await.unwrap();
    assert_eq!(handler.parent_span_id, server.span_context.span_id());
    assert!(handler
        .attributes
        .iter()
        .any(|kv| kv.key.as_str() == "endpoint" && kv.value.as_str() == "/slow"));
}

#[tokio::test]
async fn test_abandoned_request_closes_span_once() {
    let (app, telemetry) = test_app_with(&config_with_delay(5.0, 5.0));
    let _guard = telemetry.set_default();

    let abandoned = tokio::time::timeout(Duration::from_millis(100), get_text(app, "/slow")).await;
    assert!(abandoned.is_err());

    telemetry.wait_for_span("slow").await.unwrap();
    let spans = telemetry.finished_spans();
    let handlers: Vec<_> = spans.iter().filter(|span| span.name == "slow").collect();
    assert_eq!(handlers.len(), 1);
    assert_eq!(handlers[0].status, Status::Unset);
    assert_eq!(spans.iter().filter(|span| span.name == "GET /slow").count(), 1);

    let logs = telemetry.emitted_logs();
    assert!(logs
        .iter()
        .filter_map(body_text)
        .all(|message| !message.starts_with("Completed slow operation")));
}
