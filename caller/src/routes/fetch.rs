//! Fetch endpoint.
//!
//! Calls the downstream service and relays its JSON answer.
//!
//! Downstream failures answer with a non-2xx status: 502 when the downstream
//! is unreachable or answers non-2xx, 500 when its body is not JSON. A 200
//! carrying an error body would hide the failure from HTTP clients and from
//! the server span's status. The body keeps the structured shape
//! `{"error", "message"}` or `{"error", "status_code"}` so callers can still
//! tell the failure kinds apart.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use shared::span::{handler_span, mark_error, mark_ok};
use tracing::{Instrument, Span};

use crate::client::DownstreamError;
use crate::state::AppState;

/// Creates the fetch routes, with and without the trailing slash.
pub fn fetch_routes() -> Router<AppState> {
    Router::new()
        .route("/fetch-data/", get(fetch_data))
        .route("/fetch-data", get(fetch_data))
}

async fn fetch_data(State(state): State<AppState>) -> Response {
    async move {
        let span = Span::current();

        tracing::info!("Sending request to the external service.");
        match state.client().fetch(&span).await {
            Ok(response) => {
                tracing::info!(
                    status = response.status.as_u16(),
                    "Received successful response with status code {}.",
                    response.status.as_u16()
                );
                mark_ok(&span);
                Json(response.body).into_response()
            }
            Err(e) => {
                match &e {
                    DownstreamError::Request(_) => {
                        tracing::error!(
                            error.kind = e.kind(),
                            "An error occurred while requesting: {e}"
                        );
                    }
                    DownstreamError::Status { status } => {
                        tracing::error!(
                            error.kind = e.kind(),
                            status = status.as_u16(),
                            "HTTP error occurred: {e}"
                        );
                    }
                    DownstreamError::Unexpected(_) => {
                        tracing::error!(error.kind = e.kind(), "Unexpected error: {e}");
                    }
                }
                mark_error(&span, &e.to_string());
                e.into_response()
            }
        }
    }
    .instrument(handler_span("fetch-data"))
    .await
}
