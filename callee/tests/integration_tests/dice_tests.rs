//! Integration tests for `/rolldice`.

use axum::http::StatusCode;
use callee::Config;
use shared::opentelemetry::logs::Severity;
use shared::testing::body_text;

use super::common::{get_text, test_app, test_app_with};

#[tokio::test]
async fn test_rolls_stay_within_six_faces() {
    let (app, _telemetry) = test_app();

    for _ in 0..1000 {
        let (status, body) = get_text(app.clone(), "/rolldice").await;
        assert_eq!(status, StatusCode::OK);

        let value: u32 = body.parse().unwrap();
        assert!((1..=6).contains(&value), "rolled {value}");
    }
}

#[tokio::test]
async fn test_configured_sides_bound_the_roll() {
    let mut config = Config::default();
    config.dice.sides = 20;
    let (app, _telemetry) = test_app_with(&config);

    for _ in 0..200 {
        let (_, body) = get_text(app.clone(), "/rolldice?player=carol").await;
        let value: u32 = body.parse().unwrap();
        assert!((1..=20).contains(&value), "rolled {value}");
    }
}

#[tokio::test]
async fn test_named_player_is_logged() {
    let (app, telemetry) = test_app();
    let _guard = telemetry.set_default();

    let (_, body) = get_text(app, "/rolldice?player=alice").await;

    let logs = telemetry.emitted_logs();
    let warning = logs
        .iter()
        .find(|log| log.record.severity_number() == Some(Severity::Warn))
        .unwrap();
    assert_eq!(
        body_text(warning),
        Some(format!("alice is rolling the dice: {body}").as_str())
    );
}

#[tokio::test]
async fn test_anonymous_player_is_logged() {
    let (app, telemetry) = test_app();
    let _guard = telemetry.set_default();

    for uri in ["/rolldice", "/rolldice?player="] {
        get_text(app.clone(), uri).await;
    }

    let warnings: Vec<_> = telemetry
        .emitted_logs()
        .iter()
        .filter(|log| log.record.severity_number() == Some(Severity::Warn))
        .filter_map(|log| body_text(log).map(str::to_owned))
        .collect();
    assert_eq!(warnings.len(), 2);
    for warning in warnings {
        assert!(warning.starts_with("Anonymous player is rolling the dice: "));
    }
}

#[tokio::test]
async fn test_roll_log_is_correlated_with_handler_span() {
    let (app, telemetry) = test_app();
    let _guard = telemetry.set_default();

    get_text(app, "/rolldice?player=dave").await;

    let handler = telemetry.wait_for_span("rolldice").await.unwrap();
    let server = telemetry.wait_for_span("GET /rolldice").await.unwrap();
    assert_eq!(handler.parent_span_id, server.span_context.span_id());

    let logs = telemetry.emitted_logs();
    let warning = logs
        .iter()
        .find(|log| log.record.severity_number() == Some(Severity::Warn))
        .unwrap();
    let trace = warning.record.trace_context().unwrap();
    assert_eq!(trace.trace_id, handler.span_context.trace_id());
    assert_eq!(trace.span_id, handler.span_context.span_id());
}
