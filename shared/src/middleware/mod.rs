//! Inbound HTTP instrumentation.
//!
//! [`instrument`] wraps a service router with server spans, access logs, and
//! request metrics. Paths passed as excluded (health checks) get none of them.

pub mod metrics;
pub mod trace;

pub use metrics::{track_metrics, HttpMetrics};
pub use trace::{trace_layer, MakeServerSpan, RecordResponse};

use axum::Router;

/// Applies server spans and request metrics to every route of `router`.
///
/// Must be called after all routes have been added.
pub fn instrument(router: Router, metrics: HttpMetrics) -> Router {
    let tracing = trace_layer(metrics.excluded());
    router
        .layer(axum::middleware::from_fn_with_state(metrics, track_metrics))
        .layer(tracing)
}
