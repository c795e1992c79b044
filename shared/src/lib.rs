//! Shared telemetry bootstrap
//!
//! This crate wires a service's telemetry pipeline together and carries trace
//! context across one HTTP hop. Both the `caller` and `callee` services are
//! built on it.
//!
//! # Modules
//!
//! - [`resource`] - Service identity attached to every signal
//! - [`telemetry`] - Trace, metric, and log export pipelines
//! - [`logging`] - Subscriber composition and log/trace correlation
//! - [`propagation`] - W3C trace context over HTTP headers
//! - [`middleware`] - Server spans, access logs, and request metrics
//! - [`span`] - Handler-scoped spans
//! - [`config`] - Environment-driven configuration
//! - [`server`] - Server runner with graceful shutdown
//!
//! # Example
//!
//! ```
//! use shared::resource::{IdentityDefaults, ResourceIdentity};
//!
//! let identity = ResourceIdentity::from_lookup(IdentityDefaults::for_service("callee"), |_| None);
//!
//! assert_eq!(identity.service_name(), "callee");
//! assert_eq!(identity.service_version(), "0.1.0");
//! assert_eq!(identity.deployment_environment(), "development");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod logging;
pub mod middleware;
pub mod propagation;
pub mod resource;
pub mod server;
pub mod span;
pub mod telemetry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use resource::{IdentityDefaults, ResourceIdentity};
pub use telemetry::{Telemetry, TelemetryError, TelemetryGuard};

/// Re-export common dependencies for convenience.
pub use opentelemetry;
pub use tracing;
