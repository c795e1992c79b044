//! End-to-end tests: caller and a real callee served over TCP in-process.
//!
//! Both services report into the same in-memory exporters, so a single
//! request can be followed across the process boundary.

use axum::http::StatusCode;
use callee::config::DelayConfig;
use shared::testing::TestTelemetry;
use tokio::net::TcpListener;

use super::common::{get, test_app};

/// Serves a callee on an ephemeral port and returns its `/slow` URL.
async fn spawn_callee(telemetry: &TestTelemetry) -> String {
    let config = callee::Config {
        delay: DelayConfig {
            min_secs: 0.01,
            max_secs: 0.05,
        },
        ..callee::Config::default()
    };
    let router = callee::create_router(callee::AppState::new(&config, telemetry.telemetry()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}/slow")
}

#[tokio::test]
async fn test_fetch_data_spans_one_trace() {
    let telemetry = TestTelemetry::new("demo");
    let _guard = telemetry.set_default();
    let url = spawn_callee(&telemetry).await;
    let app = test_app(&telemetry, &url);

    let (status, response) = get(app, "/fetch-data/").await;

    assert_eq!(status, StatusCode::OK);
    let delay = response["delay_seconds"].as_f64().unwrap();
    assert!((0.01..=0.05).contains(&delay));
    assert!(response["message"]
        .as_str()
        .unwrap()
        .starts_with("Slow response after"));

    let caller_server = telemetry.wait_for_span("GET /fetch-data/").await.unwrap();
    let caller_handler = telemetry.wait_for_span("fetch-data").await.unwrap();
    let caller_client = telemetry.wait_for_span("GET").await.unwrap();
    let callee_server = telemetry.wait_for_span("GET /slow").await.unwrap();
    let callee_handler = telemetry.wait_for_span("slow").await.unwrap();

    let trace_id = caller_server.span_context.trace_id();
    for span in [&caller_handler, &caller_client, &callee_server, &callee_handler] {
        assert_eq!(span.span_context.trace_id(), trace_id, "span {}", span.name);
    }

    assert_eq!(
        callee_server.parent_span_id,
        caller_client.span_context.span_id()
    );
    assert_eq!(
        callee_handler.parent_span_id,
        callee_server.span_context.span_id()
    );
}

#[tokio::test]
async fn test_callee_logs_join_caller_trace() {
    let telemetry = TestTelemetry::new("demo");
    let _guard = telemetry.set_default();
    let url = spawn_callee(&telemetry).await;
    let app = test_app(&telemetry, &url);

    get(app, "/fetch-data/").await;

    let caller_server = telemetry.wait_for_span("GET /fetch-data/").await.unwrap();
    let trace_id = caller_server.span_context.trace_id();

    let logs = telemetry.emitted_logs();
    let correlated = logs
        .iter()
        .filter_map(|log| log.record.trace_context())
        .filter(|trace| trace.trace_id == trace_id)
        .count();
    // Caller: request log + success log; callee: start + completion + access log.
    assert!(correlated >= 4, "only {correlated} correlated records");
}
