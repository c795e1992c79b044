//! Downstream HTTP client.
//!
//! Every outbound request runs in its own client span, a child of the span
//! passed in by the handler, and carries that span's context in its
//! `traceparent` header so the downstream service joins the same trace.

use std::error::Error as _;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use shared::propagation::inject_context;
use shared::span::mark_error;
use tracing::field::Empty;
use tracing::{Instrument, Span};

use crate::config::DownstreamConfig;

/// Ways a downstream call can fail.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    /// The request could not be sent or its response could not be read:
    /// connection refused, DNS failure, timeout.
    #[error("{}", describe(.0))]
    Request(#[source] reqwest::Error),

    /// The downstream service answered with a non-success status.
    #[error("downstream returned {status}")]
    Status {
        /// The status received.
        status: StatusCode,
    },

    /// Anything else, e.g. a body that is not JSON.
    #[error("{0}")]
    Unexpected(String),
}

/// Renders an error with its whole source chain.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl DownstreamError {
    /// Short category used in the error response.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "Request error",
            Self::Status { .. } => "HTTP error",
            Self::Unexpected(_) => "Unexpected error",
        }
    }

    /// Status code returned to the client of the caller.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Request(_) | Self::Status { .. } => StatusCode::BAD_GATEWAY,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of a failed `/fetch-data/` request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
}

impl IntoResponse for DownstreamError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Status { status } => ErrorBody {
                error: self.kind(),
                message: None,
                status_code: Some(status.as_u16()),
            },
            Self::Request(_) | Self::Unexpected(_) => ErrorBody {
                error: self.kind(),
                message: Some(self.to_string()),
                status_code: None,
            },
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// A successful downstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamResponse {
    /// Status received.
    pub status: StatusCode,
    /// Parsed JSON body.
    pub body: Value,
}

/// Client for the configured downstream endpoint.
#[derive(Debug, Clone)]
pub struct DownstreamClient {
    http: reqwest::Client,
    url: String,
}

impl DownstreamClient {
    /// Creates a client for `config.url` with `config`'s timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &DownstreamConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }

    /// Returns the downstream URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the downstream URL as a child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`DownstreamError`] for the failure categories.
    pub async fn fetch(&self, parent: &Span) -> Result<DownstreamResponse, DownstreamError> {
        let span = tracing::info_span!(
            parent: parent,
            "client",
            otel.name = "GET",
            otel.kind = "client",
            http.request.method = "GET",
            url.full = %self.url,
            http.response.status_code = Empty,
            otel.status_code = Empty,
            otel.status_message = Empty,
        );

        let mut headers = HeaderMap::new();
        inject_context(&span, &mut headers);

        let result = self.send(headers).instrument(span.clone()).await;
        match &result {
            Ok(DownstreamResponse { status, .. }) | Err(DownstreamError::Status { status }) => {
                span.record("http.response.status_code", status.as_u16());
            }
            Err(_) => {}
        }
        if let Err(e) = &result {
            mark_error(&span, &e.to_string());
        }
        result
    }

    async fn send(&self, headers: HeaderMap) -> Result<DownstreamResponse, DownstreamError> {
        let response = self
            .http
            .get(&self.url)
            .headers(headers)
            .send()
            .await
            .map_err(DownstreamError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownstreamError::Status { status });
        }

        let bytes = response.bytes().await.map_err(DownstreamError::Request)?;
        let body = serde_json::from_slice(&bytes)
            .map_err(|e| DownstreamError::Unexpected(format!("invalid JSON body: {e}")))?;

        Ok(DownstreamResponse { status, body })
    }
}
