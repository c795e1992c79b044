//! Telemetry bootstrap.
//!
//! Builds the three OTLP export pipelines (traces, metrics, logs) for a
//! [`ResourceIdentity`] and bundles them into a [`Telemetry`] handle. The
//! handle is constructed once at startup, passed to whatever needs it, and
//! installed process-wide through [`Telemetry::install`].
//!
//! Export failures stay inside the SDK pipelines: batches that cannot be
//! delivered are retried by the exporter, then dropped and logged locally.
//! They never reach request handling.

use std::fmt;
use std::sync::OnceLock;

use opentelemetry::metrics::{Meter, MeterProvider as _};
use opentelemetry_otlp::{
    ExporterBuildError, LogExporter, MetricExporter, SpanExporter, WithExportConfig,
};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::SdkTracerProvider;
use thiserror::Error;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::{ConfigError, Protocol, TelemetryConfig};
use crate::logging;
use crate::propagation;
use crate::resource::{IdentityDefaults, ResourceIdentity};

static INSTALLED: OnceLock<Telemetry> = OnceLock::new();

/// The telemetry signal an export pipeline carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Spans.
    Traces,
    /// Counters and histograms.
    Metrics,
    /// Log records.
    Logs,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Traces => write!(f, "traces"),
            Self::Metrics => write!(f, "metrics"),
            Self::Logs => write!(f, "logs"),
        }
    }
}

/// Errors raised by the telemetry bootstrap.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// An OTLP exporter could not be constructed.
    #[error("failed to build {signal} exporter: {source}")]
    Exporter {
        /// The pipeline the exporter belongs to.
        signal: Signal,
        /// The underlying failure.
        #[source]
        source: ExporterBuildError,
    },

    /// The telemetry configuration could not be read.
    #[error("invalid telemetry configuration: {0}")]
    Config(#[from] ConfigError),

    /// [`Telemetry::install`] was called more than once.
    #[error("telemetry is already installed for this process")]
    AlreadyInstalled,

    /// Another global tracing subscriber was already set.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),

    /// A provider failed to flush or shut down.
    #[error("failed to shut down {signal} provider: {message}")]
    Shutdown {
        /// The pipeline that failed.
        signal: Signal,
        /// Description from the SDK.
        message: String,
    },
}

/// Builds the trace pipeline: OTLP span exporter behind a batch processor.
///
/// # Errors
///
/// Returns [`TelemetryError::Exporter`] if the exporter cannot be built.
pub fn init_tracing(
    identity: &ResourceIdentity,
    config: &TelemetryConfig,
) -> Result<SdkTracerProvider, TelemetryError> {
    let builder = SdkTracerProvider::builder().with_resource(identity.to_resource());

    if !config.export_enabled {
        return Ok(builder.build());
    }

    let exporter = match config.protocol {
        Protocol::Grpc => SpanExporter::builder().with_tonic().build(),
        Protocol::HttpProtobuf => SpanExporter::builder()
            .with_http()
            .with_protocol(opentelemetry_otlp::Protocol::HttpBinary)
            .build(),
    }
    .map_err(|source| TelemetryError::Exporter {
        signal: Signal::Traces,
        source,
    })?;

    Ok(builder.with_batch_exporter(exporter).build())
}

/// Builds the metric pipeline: OTLP metric exporter behind a periodic reader.
///
/// # Errors
///
/// Returns [`TelemetryError::Exporter`] if the exporter cannot be built.
pub fn init_metrics(
    identity: &ResourceIdentity,
    config: &TelemetryConfig,
) -> Result<SdkMeterProvider, TelemetryError> {
    let builder = SdkMeterProvider::builder().with_resource(identity.to_resource());

    if !config.export_enabled {
        return Ok(builder.build());
    }

    let exporter = match config.protocol {
        Protocol::Grpc => MetricExporter::builder().with_tonic().build(),
        Protocol::HttpProtobuf => MetricExporter::builder()
            .with_http()
            .with_protocol(opentelemetry_otlp::Protocol::HttpBinary)
            .build(),
    }
    .map_err(|source| TelemetryError::Exporter {
        signal: Signal::Metrics,
        source,
    })?;

    let reader = PeriodicReader::builder(exporter).build();
    Ok(builder.with_reader(reader).build())
}

/// Builds the log pipeline: OTLP log exporter behind a batch processor.
///
/// # Errors
///
/// Returns [`TelemetryError::Exporter`] if the exporter cannot be built.
pub fn init_logging(
    identity: &ResourceIdentity,
    config: &TelemetryConfig,
) -> Result<SdkLoggerProvider, TelemetryError> {
    let builder = SdkLoggerProvider::builder().with_resource(identity.to_resource());

    if !config.export_enabled {
        return Ok(builder.build());
    }

    let exporter = match config.protocol {
        Protocol::Grpc => LogExporter::builder().with_tonic().build(),
        Protocol::HttpProtobuf => LogExporter::builder()
            .with_http()
            .with_protocol(opentelemetry_otlp::Protocol::HttpBinary)
            .build(),
    }
    .map_err(|source| TelemetryError::Exporter {
        signal: Signal::Logs,
        source,
    })?;

    Ok(builder.with_batch_exporter(exporter).build())
}

/// Handle to the trace, metric, and log providers of one service.
///
/// Cloning is cheap and every clone shares the same pipelines.
///
/// # Example
///
/// ```no_run
/// use shared::config::TelemetryConfig;
/// use shared::resource::{IdentityDefaults, ResourceIdentity};
/// use shared::telemetry::Telemetry;
///
/// # async fn run() -> Result<(), shared::telemetry::TelemetryError> {
/// let config = TelemetryConfig::default();
/// let identity = ResourceIdentity::from_env(IdentityDefaults::for_service("callee"));
/// let guard = Telemetry::init(identity, &config).install(&config)?;
///
/// tracing::info!("service started");
///
/// guard.shutdown()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Telemetry {
    identity: ResourceIdentity,
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    logger_provider: SdkLoggerProvider,
    degraded: Vec<String>,
}

impl Telemetry {
    /// Builds all three pipelines for `identity`.
    ///
    /// A pipeline whose exporter cannot be built falls back to a provider
    /// without exporter; the failure is logged once the handle is installed.
    /// Must be called from within a Tokio runtime when using gRPC.
    #[must_use]
    pub fn init(identity: ResourceIdentity, config: &TelemetryConfig) -> Self {
        let mut degraded = Vec::new();

        let tracer_provider = init_tracing(&identity, config).unwrap_or_else(|e| {
            degraded.push(e.to_string());
            SdkTracerProvider::builder()
                .with_resource(identity.to_resource())
                .build()
        });

        let meter_provider = init_metrics(&identity, config).unwrap_or_else(|e| {
            degraded.push(e.to_string());
            SdkMeterProvider::builder()
                .with_resource(identity.to_resource())
                .build()
        });

        let logger_provider = init_logging(&identity, config).unwrap_or_else(|e| {
            degraded.push(e.to_string());
            SdkLoggerProvider::builder()
                .with_resource(identity.to_resource())
                .build()
        });

        Self {
            identity,
            tracer_provider,
            meter_provider,
            logger_provider,
            degraded,
        }
    }

    /// Reads identity and telemetry configuration from the environment,
    /// builds the pipelines, and installs them process-wide.
    ///
    /// Returns the handle to pass to the service together with the guard that
    /// flushes everything on shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or installation fails.
    pub fn bootstrap(defaults: IdentityDefaults) -> Result<(Self, TelemetryGuard), TelemetryError> {
        let config = TelemetryConfig::from_env()?;
        let identity = ResourceIdentity::from_env(defaults);
        let telemetry = Self::init(identity, &config);
        let guard = telemetry.clone().install(&config)?;
        Ok((telemetry, guard))
    }

    /// Wraps providers built elsewhere, e.g. with in-memory exporters.
    #[must_use]
    pub fn from_providers(
        identity: ResourceIdentity,
        tracer_provider: SdkTracerProvider,
        meter_provider: SdkMeterProvider,
        logger_provider: SdkLoggerProvider,
    ) -> Self {
        Self {
            identity,
            tracer_provider,
            meter_provider,
            logger_provider,
            degraded: Vec::new(),
        }
    }

    /// Returns the handle installed by [`Telemetry::install`], if any.
    #[must_use]
    pub fn global() -> Option<&'static Self> {
        INSTALLED.get()
    }

    /// Returns the service identity.
    #[must_use]
    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    /// Returns the tracer provider.
    #[must_use]
    pub fn tracer_provider(&self) -> &SdkTracerProvider {
        &self.tracer_provider
    }

    /// Returns the meter provider.
    #[must_use]
    pub fn meter_provider(&self) -> &SdkMeterProvider {
        &self.meter_provider
    }

    /// Returns the logger provider.
    #[must_use]
    pub fn logger_provider(&self) -> &SdkLoggerProvider {
        &self.logger_provider
    }

    /// Returns a meter scoped to `scope`.
    #[must_use]
    pub fn meter(&self, scope: &'static str) -> Meter {
        self.meter_provider.meter(scope)
    }

    /// Descriptions of pipelines that fell back to no exporter.
    #[must_use]
    pub fn degraded(&self) -> &[String] {
        &self.degraded
    }

    /// Installs this handle as the process-wide telemetry.
    ///
    /// Sets the global tracing subscriber (console output, span export, log
    /// export with trace correlation), the global tracer and meter providers,
    /// and the W3C trace context propagator. `log` crate records from
    /// third-party crates are routed through the same subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::AlreadyInstalled`] on a second call, or
    /// [`TelemetryError::Subscriber`] if another global subscriber exists.
    /// A failed call leaves nothing installed.
    pub fn install(self, config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
        if INSTALLED.get().is_some() {
            return Err(TelemetryError::AlreadyInstalled);
        }

        logging::subscriber(&self, config, std::io::stdout).try_init()?;

        INSTALLED
            .set(self.clone())
            .map_err(|_| TelemetryError::AlreadyInstalled)?;

        opentelemetry::global::set_tracer_provider(self.tracer_provider.clone());
        opentelemetry::global::set_meter_provider(self.meter_provider.clone());
        propagation::init_propagator();

        for reason in &self.degraded {
            tracing::warn!(%reason, "OTLP export unavailable, continuing without it");
        }

        tracing::info!(
            service.name = %self.identity.service_name(),
            service.version = %self.identity.service_version(),
            deployment.environment = %self.identity.deployment_environment(),
            export = config.export_enabled,
            "Telemetry initialized"
        );

        Ok(TelemetryGuard {
            telemetry: Some(self),
        })
    }

    /// Flushes and shuts down all three pipelines.
    ///
    /// Every pipeline is attempted even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`TelemetryError::Shutdown`] encountered.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        let results = [
            (Signal::Traces, self.tracer_provider.shutdown()),
            (Signal::Logs, self.logger_provider.shutdown()),
            (Signal::Metrics, self.meter_provider.shutdown()),
        ];

        results
            .into_iter()
            .find_map(|(signal, result)| {
                result.err().map(|e| TelemetryError::Shutdown {
                    signal,
                    message: e.to_string(),
                })
            })
            .map_or(Ok(()), Err)
    }
}

/// Shuts the pipelines down when dropped, draining buffered records.
#[must_use = "dropping the guard shuts down telemetry"]
pub struct TelemetryGuard {
    telemetry: Option<Telemetry>,
}

impl fmt::Debug for TelemetryGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryGuard")
            .field("active", &self.telemetry.is_some())
            .finish_non_exhaustive()
    }
}

impl TelemetryGuard {
    /// Shuts down explicitly, reporting failures.
    ///
    /// # Errors
    ///
    /// Returns the first pipeline shutdown failure.
    pub fn shutdown(mut self) -> Result<(), TelemetryError> {
        match self.telemetry.take() {
            Some(telemetry) => telemetry.shutdown(),
            None => Ok(()),
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(telemetry) = self.telemetry.take() {
            if let Err(e) = telemetry.shutdown() {
                eprintln!("Error shutting down telemetry: {e}");
            }
        }
    }
}
