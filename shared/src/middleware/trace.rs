//! Server spans for inbound HTTP requests.
//!
//! Built on tower-http's [`TraceLayer`]: every request outside the excluded
//! paths gets a server span whose parent is the trace context found in the
//! request headers, plus one `info` access log when the response is ready.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::MatchedPath;
use http::{Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::field::Empty;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::propagation::extract_context;

/// The trace layer type returned by [`trace_layer`].
pub type HttpTraceLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeServerSpan, DefaultOnRequest, RecordResponse>;

/// Creates the trace layer; requests to `excluded` paths are not traced.
#[must_use]
pub fn trace_layer(excluded: &[&'static str]) -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(MakeServerSpan::new(excluded))
        .on_response(RecordResponse)
}

/// Opens a server span per request, continuing any incoming trace.
#[derive(Debug, Clone)]
pub struct MakeServerSpan {
    excluded: Arc<[&'static str]>,
}

impl MakeServerSpan {
    /// Creates the span factory.
    #[must_use]
    pub fn new(excluded: &[&'static str]) -> Self {
        Self {
            excluded: excluded.into(),
        }
    }

    /// Returns true if `path` is not traced.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|p| *p == path)
    }
}

impl<B> MakeSpan<B> for MakeServerSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let path = request.uri().path();
        if self.is_excluded(path) {
            return Span::none();
        }

        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map_or(path, MatchedPath::as_str);
        let method = request.method();
        let name = format!("{method} {route}");

        let span = tracing::info_span!(
            "request",
            otel.name = name.as_str(),
            otel.kind = "server",
            otel.status_code = Empty,
            http.request.method = %method,
            http.route = route,
            url.path = path,
            http.response.status_code = Empty,
        );

        if let Err(error) = span.set_parent(extract_context(request.headers())) {
            tracing::debug!(?error, "Could not attach incoming trace context");
        }
        span
    }
}

/// Records the response status on the server span and writes the access log.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordResponse;

impl<B> OnResponse<B> for RecordResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        if span.is_disabled() {
            return;
        }

        let status = response.status();
        span.record("http.response.status_code", status.as_u16());
        if status.is_server_error() {
            span.record("otel.status_code", "ERROR");
        }

        tracing::info!(
            status = status.as_u16(),
            latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            "request completed"
        );
    }
}
