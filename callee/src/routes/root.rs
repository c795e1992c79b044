//! Root endpoint.

use axum::{routing::get, Json, Router};
use serde::Serialize;
use shared::span::{handler_span, mark_ok};
use tracing::{Instrument, Span};

use crate::state::AppState;

/// Greeting returned by `/`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Greeting text.
    pub message: &'static str,
}

/// Creates the root route.
pub fn root_routes() -> Router<AppState> {
    Router::new().route("/", get(root))
}

async fn root() -> Json<MessageResponse> {
    async {
        tracing::debug!("Processing root request");
        mark_ok(&Span::current());
        Json(MessageResponse {
            message: "Hello from callee",
        })
    }
    .instrument(handler_span("root"))
    .await
}
