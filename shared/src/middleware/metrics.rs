//! HTTP server metrics.
//!
//! Records a request counter and a request duration histogram for every
//! request outside the excluded paths, tagged with method, route, and status.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;

/// Request metrics recorded by [`track_metrics`].
#[derive(Clone)]
pub struct HttpMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
    excluded: Arc<[&'static str]>,
}

impl fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMetrics")
            .field("excluded", &self.excluded)
            .finish_non_exhaustive()
    }
}

impl HttpMetrics {
    /// Creates the instruments on `meter`; `excluded` paths are not recorded.
    #[must_use]
    pub fn new(meter: &Meter, excluded: &[&'static str]) -> Self {
        let requests = meter
            .u64_counter("http.server.requests")
            .with_description("Number of HTTP requests handled")
            .build();
        let duration = meter
            .f64_histogram("http.server.request.duration")
            .with_description("Duration of HTTP server requests")
            .with_unit("s")
            .build();

        Self {
            requests,
            duration,
            excluded: excluded.into(),
        }
    }

    /// Returns the paths that are not recorded.
    #[must_use]
    pub fn excluded(&self) -> &[&'static str] {
        &self.excluded
    }

    /// Returns true if `path` is not recorded.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|p| *p == path)
    }

    /// Records one completed request.
    pub fn record(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let attributes = [
            KeyValue::new("http.request.method", method.to_string()),
            KeyValue::new("http.route", route.to_string()),
            KeyValue::new("http.response.status_code", i64::from(status)),
        ];
        self.requests.add(1, &attributes);
        self.duration.record(elapsed.as_secs_f64(), &attributes);
    }
}

/// Middleware recording [`HttpMetrics`] for each request.
pub async fn track_metrics(
    State(metrics): State<HttpMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if metrics.is_excluded(&path) {
        return next.run(request).await;
    }

    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(path, |matched| matched.as_str().to_string());
    let method = request.method().to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    metrics.record(&method, &route, response.status().as_u16(), start.elapsed());

    response
}
