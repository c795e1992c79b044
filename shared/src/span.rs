//! Handler-scoped spans.
//!
//! A handler opens its span with [`handler_span`] and runs its body inside it
//! with [`tracing::Instrument::instrument`]. The span closes when the
//! instrumented future completes or is dropped, so it is closed exactly once
//! on success, error, early return, or client disconnect.

use opentelemetry::{Key, Value};
use tracing::field::Empty;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Opens a span for a request handler.
///
/// The exported span is named `name`. Status fields start empty. Handlers
/// fill them with [`mark_ok`] or [`mark_error`] before returning, so only a
/// span dropped mid-request exports with status unset.
#[must_use]
pub fn handler_span(name: &'static str) -> Span {
    tracing::info_span!(
        "handler",
        otel.name = name,
        otel.status_code = Empty,
        otel.status_message = Empty,
    )
}

/// Marks `span` as failed with the given description.
pub fn mark_error(span: &Span, message: &str) {
    span.record("otel.status_code", "ERROR");
    span.record("otel.status_message", message);
}

/// Attaches an attribute to the exported span.
///
/// Unlike span fields, the key does not have to be declared when the span is
/// opened.
pub fn set_attribute(span: &Span, key: impl Into<Key>, value: impl Into<Value>) {
    span.set_attribute(key, value);
}

/// Marks `span` as completed successfully.
pub fn mark_ok(span: &Span) {
    span.record("otel.status_code", "OK");
}
