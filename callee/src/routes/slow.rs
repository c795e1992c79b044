//! Slow endpoint.
//!
//! Waits for a random delay before answering, giving the caller's trace a
//! visibly long downstream segment.

use std::time::{Duration, Instant};

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use shared::span::{handler_span, mark_ok, set_attribute};
use tracing::{Instrument, Span};

use crate::state::AppState;

/// Response of `/slow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowResponse {
    /// Human-readable summary, e.g. `Slow response after 0.42 seconds`.
    pub message: String,
    /// The delay that was slept, in seconds.
    pub delay_seconds: f64,
}

impl SlowResponse {
    fn after(delay_seconds: f64) -> Self {
        Self {
            message: format!("Slow response after {delay_seconds:.2} seconds"),
            delay_seconds,
        }
    }
}

/// Creates the slow route.
pub fn slow_routes() -> Router<AppState> {
    Router::new().route("/slow", get(slow))
}

async fn slow(State(state): State<AppState>) -> Json<SlowResponse> {
    let started = Instant::now();
    let delay = state.delay().sample(&mut rand::rng());

    let span = handler_span("slow");
    set_attribute(&span, "endpoint", "/slow");
    set_attribute(&span, "delay", delay);

    async move {
        tracing::info!("Starting slow operation");

        tokio::time::sleep(Duration::from_secs_f64(delay)).await;

        let duration = started.elapsed().as_secs_f64();
        tracing::info!(
            duration_seconds = duration,
            "Completed slow operation in {duration:.2} seconds"
        );
        mark_ok(&Span::current());
        Json(SlowResponse::after(delay))
    }
    .instrument(span)
    .await
}
