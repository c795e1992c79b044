//! HTTP server binding configuration.

use std::net::{IpAddr, SocketAddr};

use super::ConfigError;

/// Server binding configuration.
///
/// Each service reads its own prefixed variables, e.g. with prefix `CALLEE`:
/// - `CALLEE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `CALLEE_PORT`: The port to listen on (default: service specific)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
}

impl ServerConfig {
    /// Creates a configuration with the default host and the given port.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port,
        }
    }

    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `<PREFIX>_PORT` is set but is not a valid port number.
    pub fn from_env(prefix: &str, default_port: u16) -> Result<Self, ConfigError> {
        Self::from_lookup(prefix, default_port, |key| std::env::var(key).ok())
    }

    /// Creates a new configuration from an environment snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if `<PREFIX>_PORT` is set but is not a valid port number.
    pub fn from_lookup<F>(prefix: &str, default_port: u16, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::with_port(default_port);

        let host = lookup(&format!("{prefix}_HOST")).unwrap_or(defaults.host);

        let port_key = format!("{prefix}_PORT");
        let port = match lookup(&port_key) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort {
                    key: port_key,
                    value: raw,
                    source,
                })?,
            None => defaults.port,
        };

        Ok(Self { host, port })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not a valid IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
