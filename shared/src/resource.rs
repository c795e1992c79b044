//! Resource identity.
//!
//! Identifies which service produced a given span, metric, or log record. The
//! identity is built once at startup and shared by all three export pipelines.

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource::SERVICE_VERSION;

/// Environment variable holding the service name.
pub const SERVICE_NAME_ENV: &str = "OTEL_SERVICE_NAME";
/// Environment variable holding the service version.
pub const SERVICE_VERSION_ENV: &str = "OTEL_SERVICE_VERSION";
/// Environment variable holding the deployment environment.
pub const DEPLOYMENT_ENVIRONMENT_ENV: &str = "OTEL_DEPLOYMENT_ENVIRONMENT";

/// Resource attribute key for the deployment environment.
pub const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";

/// Fallback values used when an identity field is unset or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityDefaults {
    /// Default service name.
    pub service_name: &'static str,
    /// Default service version.
    pub service_version: &'static str,
    /// Default deployment environment.
    pub deployment_environment: &'static str,
}

impl IdentityDefaults {
    /// Creates defaults for the given service name, with version `0.1.0` and
    /// environment `development`.
    #[must_use]
    pub const fn for_service(service_name: &'static str) -> Self {
        Self {
            service_name,
            service_version: "0.1.0",
            deployment_environment: "development",
        }
    }
}

/// Immutable identity of the running service.
///
/// # Example
///
/// ```
/// use shared::resource::{IdentityDefaults, ResourceIdentity};
///
/// let identity = ResourceIdentity::from_lookup(IdentityDefaults::for_service("callee"), |key| {
///     (key == "OTEL_DEPLOYMENT_ENVIRONMENT").then(|| "staging".to_string())
/// });
///
/// assert_eq!(identity.service_name(), "callee");
/// assert_eq!(identity.deployment_environment(), "staging");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    service_name: String,
    service_version: String,
    deployment_environment: String,
}

impl ResourceIdentity {
    /// Creates an identity from explicit values.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        service_version: impl Into<String>,
        deployment_environment: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
            deployment_environment: deployment_environment.into(),
        }
    }

    /// Builds the identity from the process environment.
    #[must_use]
    pub fn from_env(defaults: IdentityDefaults) -> Self {
        Self::from_lookup(defaults, |key| std::env::var(key).ok())
    }

    /// Builds the identity from an environment snapshot.
    ///
    /// Each field falls back to its default when the lookup yields nothing or
    /// a blank string.
    #[must_use]
    pub fn from_lookup<F>(defaults: IdentityDefaults, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            service_name: read(SERVICE_NAME_ENV, defaults.service_name),
            service_version: read(SERVICE_VERSION_ENV, defaults.service_version),
            deployment_environment: read(
                DEPLOYMENT_ENVIRONMENT_ENV,
                defaults.deployment_environment,
            ),
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the service version.
    #[must_use]
    pub fn service_version(&self) -> &str {
        &self.service_version
    }

    /// Returns the deployment environment.
    #[must_use]
    pub fn deployment_environment(&self) -> &str {
        &self.deployment_environment
    }

    /// Converts the identity into an OpenTelemetry resource.
    #[must_use]
    pub fn to_resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.service_name.clone())
            .with_attributes([
                KeyValue::new(SERVICE_VERSION, self.service_version.clone()),
                KeyValue::new(DEPLOYMENT_ENVIRONMENT, self.deployment_environment.clone()),
            ])
            .build()
    }
}
