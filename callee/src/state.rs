//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use shared::middleware::HttpMetrics;
use shared::Telemetry;

use crate::config::{Config, DelayConfig, DiceConfig};
use crate::UNTRACED_PATHS;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    dice: DiceConfig,
    delay: DelayConfig,
    metrics: HttpMetrics,
}

impl AppState {
    /// Creates the state from configuration, recording metrics through
    /// `telemetry`'s meter provider.
    #[must_use]
    pub fn new(config: &Config, telemetry: &Telemetry) -> Self {
        Self {
            dice: config.dice,
            delay: config.delay,
            metrics: HttpMetrics::new(
                &telemetry.meter(env!("CARGO_PKG_NAME")),
                UNTRACED_PATHS,
            ),
        }
    }

    /// Returns the dice settings.
    #[must_use]
    pub fn dice(&self) -> &DiceConfig {
        &self.dice
    }

    /// Returns the delay bounds.
    #[must_use]
    pub fn delay(&self) -> &DelayConfig {
        &self.delay
    }

    /// Returns the HTTP metric instruments.
    #[must_use]
    pub fn metrics(&self) -> &HttpMetrics {
        &self.metrics
    }
}
