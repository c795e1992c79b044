//! Configuration shared by both services.
//!
//! Everything is read from environment variables with defaults. The
//! `from_lookup` constructors take an environment snapshot so they can be
//! tested without touching the process environment.

pub mod server;
pub mod telemetry;

pub use server::ServerConfig;
pub use telemetry::{LogFormat, Protocol, TelemetryConfig};

use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A port variable did not hold a valid port number.
    #[error("{key}={value:?} is not a valid port: {source}")]
    InvalidPort {
        /// The environment variable.
        key: String,
        /// The raw value.
        value: String,
        /// The parse failure.
        source: std::num::ParseIntError,
    },

    /// The bind host is not an IP address.
    #[error("invalid bind host: {0}")]
    InvalidHost(String),

    /// A numeric setting could not be parsed.
    #[error("{key}={value:?} is not a valid number")]
    InvalidNumber {
        /// The environment variable.
        key: String,
        /// The raw value.
        value: String,
    },

    /// The OTLP protocol is not supported.
    #[error("unsupported OTLP protocol: {0}")]
    UnsupportedProtocol(String),

    /// The log format is not supported.
    #[error("unsupported log format: {0}")]
    UnsupportedLogFormat(String),
}

/// Parses an optional numeric variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but does not parse.
pub fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: key.to_string(),
                    value: raw,
                })
        }
        _ => Ok(default),
    }
}
