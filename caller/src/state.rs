//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use shared::middleware::HttpMetrics;
use shared::Telemetry;

use crate::client::DownstreamClient;
use crate::config::Config;
use crate::UNTRACED_PATHS;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    client: DownstreamClient,
    metrics: HttpMetrics,
}

impl AppState {
    /// Creates the state from configuration, recording metrics through
    /// `telemetry`'s meter provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the downstream HTTP client cannot be built.
    pub fn new(config: &Config, telemetry: &Telemetry) -> reqwest::Result<Self> {
        Ok(Self {
            client: DownstreamClient::new(&config.downstream)?,
            metrics: HttpMetrics::new(
                &telemetry.meter(env!("CARGO_PKG_NAME")),
                UNTRACED_PATHS,
            ),
        })
    }

    /// Returns the downstream client.
    #[must_use]
    pub fn client(&self) -> &DownstreamClient {
        &self.client
    }

    /// Returns the HTTP metric instruments.
    #[must_use]
    pub fn metrics(&self) -> &HttpMetrics {
        &self.metrics
    }
}
