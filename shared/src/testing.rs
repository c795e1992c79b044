//! In-memory telemetry for tests.
//!
//! [`TestTelemetry`] wires the same subscriber the services run with to
//! in-memory exporters, so tests can assert on exported spans and log records.
//! Spans and logs are exported synchronously when they end.

use opentelemetry::logs::AnyValue;
use opentelemetry_sdk::logs::{InMemoryLogExporter, SdkLoggerProvider};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tracing::subscriber::DefaultGuard;

use crate::config::TelemetryConfig;
use crate::logging;
use crate::resource::ResourceIdentity;
use crate::telemetry::Telemetry;

/// Exported log record together with its resource and scope.
pub type EmittedLog = opentelemetry_sdk::logs::in_memory_exporter::LogDataWithResource;

/// Returns the text body of an exported log record, if it has one.
#[must_use]
pub fn body_text(log: &EmittedLog) -> Option<&str> {
    match log.record.body()? {
        AnyValue::String(text) => Some(text.as_str()),
        _ => None,
    }
}

/// A [`Telemetry`] handle backed by in-memory exporters.
#[derive(Debug, Clone)]
pub struct TestTelemetry {
    telemetry: Telemetry,
    spans: InMemorySpanExporter,
    logs: InMemoryLogExporter,
    metrics: InMemoryMetricExporter,
}

impl TestTelemetry {
    /// Creates in-memory pipelines for a service called `service_name`.
    #[must_use]
    pub fn new(service_name: &str) -> Self {
        let identity = ResourceIdentity::new(service_name, "0.0.0-test", "test");

        let spans = InMemorySpanExporter::default();
        let tracer_provider = SdkTracerProvider::builder()
            .with_resource(identity.to_resource())
            .with_simple_exporter(spans.clone())
            .build();

        let logs = InMemoryLogExporter::default();
        let logger_provider = SdkLoggerProvider::builder()
            .with_resource(identity.to_resource())
            .with_simple_exporter(logs.clone())
            .build();

        let metrics = InMemoryMetricExporter::default();
        let meter_provider = SdkMeterProvider::builder()
            .with_resource(identity.to_resource())
            .with_reader(PeriodicReader::builder(metrics.clone()).build())
            .build();

        Self {
            telemetry: Telemetry::from_providers(
                identity,
                tracer_provider,
                meter_provider,
                logger_provider,
            ),
            spans,
            logs,
            metrics,
        }
    }

    /// Returns the underlying handle.
    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Installs the subscriber for the current thread until the guard drops.
    ///
    /// Use a current-thread runtime (the `#[tokio::test]` default) so that
    /// spawned tasks see the same subscriber.
    #[must_use = "the subscriber is removed when the guard drops"]
    pub fn set_default(&self) -> DefaultGuard {
        let config = TelemetryConfig::console_only();
        let subscriber = logging::subscriber(
            &self.telemetry,
            &config,
            tracing_subscriber::fmt::TestWriter::new(),
        );
        tracing::subscriber::set_default(subscriber)
    }

    /// Spans that have ended so far, in the order they ended.
    #[must_use]
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.spans.get_finished_spans().unwrap_or_default()
    }

    /// Log records exported so far.
    #[must_use]
    pub fn emitted_logs(&self) -> Vec<EmittedLog> {
        self.logs.get_emitted_logs().unwrap_or_default()
    }

    /// Flushes pending metrics and reports whether any were exported.
    #[must_use]
    pub fn has_metrics(&self) -> bool {
        if self.telemetry.meter_provider().force_flush().is_err() {
            return false;
        }
        self.metrics
            .get_finished_metrics()
            .is_ok_and(|exported| !exported.is_empty())
    }

    /// Returns the finished span named `name`, waiting briefly for it to end.
    ///
    /// Server spans end when the response body has been written, which can be
    /// after the client has already read the response.
    pub async fn wait_for_span(&self, name: &str) -> Option<SpanData> {
        for _ in 0..50 {
            if let Some(span) = self.finished_spans().into_iter().find(|s| s.name == name) {
                return Some(span);
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        None
    }
}
