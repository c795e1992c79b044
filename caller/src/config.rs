//! Caller configuration.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::time::Duration;

use anyhow::Result;
use shared::config::{parse_or, ServerConfig};
use validator::Validate;

/// Default port of the caller service.
pub const DEFAULT_PORT: u16 = 8000;

/// Default downstream endpoint, the callee's `/slow` route.
pub const DEFAULT_DOWNSTREAM_URL: &str = "http://callee:5000/slow";

/// Default downstream request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where and how the caller reaches its downstream service.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct DownstreamConfig {
    /// Absolute URL fetched by `/fetch-data/`.
    #[validate(url)]
    pub url: String,
    /// Whole-request timeout in seconds.
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

impl DownstreamConfig {
    /// Returns the timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DOWNSTREAM_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Caller configuration.
///
/// Configuration values can be set via environment variables:
/// - `CALLER_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `CALLER_PORT`: The port to listen on (default: 8000)
/// - `CALLER_DOWNSTREAM_URL`: URL fetched by `/fetch-data/` (default: `http://callee:5000/slow`)
/// - `CALLER_DOWNSTREAM_TIMEOUT_SECS`: Downstream timeout (default: 10)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server binding.
    pub server: ServerConfig,
    /// Downstream settings.
    pub downstream: DownstreamConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if the
    /// downstream URL is not an absolute URL.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a new configuration from an environment snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if the
    /// downstream URL is not an absolute URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig::from_lookup("CALLER", DEFAULT_PORT, &lookup)?;

        let downstream = DownstreamConfig {
            url: lookup("CALLER_DOWNSTREAM_URL")
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_DOWNSTREAM_URL.to_string()),
            timeout_secs: parse_or(
                &lookup,
                "CALLER_DOWNSTREAM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?,
        };
        downstream.validate()?;

        Ok(Self { server, downstream })
    }

    /// Returns a copy with the downstream URL replaced.
    #[must_use]
    pub fn with_downstream_url(mut self, url: impl Into<String>) -> Self {
        self.downstream.url = url.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::with_port(DEFAULT_PORT),
            downstream: DownstreamConfig::default(),
        }
    }
}
