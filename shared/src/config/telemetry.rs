//! Telemetry pipeline configuration.
//!
//! Only the knobs the bootstrap itself needs live here. Collector endpoint,
//! headers, TLS and timeouts are read by the OTLP exporters directly from the
//! standard `OTEL_EXPORTER_OTLP_*` variables.

use std::str::FromStr;

use super::ConfigError;

/// Disables all exporters when set to `true`.
pub const SDK_DISABLED_ENV: &str = "OTEL_SDK_DISABLED";
/// Selects the OTLP transport.
pub const PROTOCOL_ENV: &str = "OTEL_EXPORTER_OTLP_PROTOCOL";
/// Console log filter directives.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";
/// Console log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// OTLP transport protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// OTLP over gRPC (tonic).
    #[default]
    Grpc,
    /// OTLP over HTTP with protobuf payloads.
    HttpProtobuf,
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grpc" => Ok(Self::Grpc),
            "http/protobuf" | "http" => Ok(Self::HttpProtobuf),
            other => Err(ConfigError::UnsupportedProtocol(other.to_string())),
        }
    }
}

/// Console log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable single-line output.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedLogFormat(other.to_string())),
        }
    }
}

/// Configuration for the telemetry bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Whether OTLP exporters are attached to the providers.
    pub export_enabled: bool,
    /// OTLP transport protocol.
    pub protocol: Protocol,
    /// Console filter directives (e.g. `info,tower_http=debug`).
    pub log_filter: String,
    /// Console output format.
    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            export_enabled: true,
            protocol: Protocol::default(),
            log_filter: "info".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl TelemetryConfig {
    /// Creates a configuration that never exports, for local runs and tests.
    #[must_use]
    pub fn console_only() -> Self {
        Self {
            export_enabled: false,
            ..Self::default()
        }
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the protocol or log format is not recognised.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration from an environment snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the protocol or log format is not recognised.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let export_enabled = !lookup(SDK_DISABLED_ENV)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        let protocol = lookup(PROTOCOL_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(defaults.protocol);

        let log_filter = lookup(LOG_FILTER_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        let log_format = lookup(LOG_FORMAT_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(defaults.log_format);

        Ok(Self {
            export_enabled,
            protocol,
            log_filter,
            log_format,
        })
    }
}
