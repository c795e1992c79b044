//! Integration tests for inbound W3C trace context.

use shared::opentelemetry::trace::{SpanId, SpanKind, TraceId};

use super::common::{get_text_with_headers, test_app};

const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

#[tokio::test]
async fn test_incoming_traceparent_becomes_parent() {
    let (app, telemetry) = test_app();
    let _guard = telemetry.set_default();

    get_text_with_headers(app, "/rolldice", &[("traceparent", TRACEPARENT)]).await;

    let server = telemetry.wait_for_span("GET /rolldice").await.unwrap();
    let expected_trace = TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap();
    assert_eq!(server.span_context.trace_id(), expected_trace);
    assert_eq!(
        server.parent_span_id,
        SpanId::from_hex("00f067aa0ba902b7").unwrap()
    );
    assert_eq!(server.span_kind, SpanKind::Server);

    let handler = telemetry.wait_for_span("rolldice").await.unwrap();
    assert_eq!(handler.span_context.trace_id(), expected_trace);
}

#[tokio::test]
async fn test_malformed_traceparent_starts_new_trace() {
    let (app, telemetry) = test_app();
    let _guard = telemetry.set_default();

    get_text_with_headers(app, "/", &[("traceparent", "not-a-trace")]).await;

    let server = telemetry.wait_for_span("GET /").await.unwrap();
    assert_eq!(server.parent_span_id, SpanId::INVALID);
    assert_ne!(server.span_context.trace_id(), TraceId::INVALID);
}
