//! Log-trace correlation.
//!
//! Composes the tracing subscriber every service runs with:
//!
//! - a console layer (text or JSON),
//! - the `tracing-opentelemetry` layer turning spans into exported spans,
//! - the `opentelemetry-appender-tracing` bridge turning events into exported
//!   log records.
//!
//! An event emitted while a span is active is exported with that span's trace
//! id and span id. Events outside any span carry neither.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogFormat, TelemetryConfig};
use crate::telemetry::Telemetry;

/// Crates whose events must not be fed back into the log export pipeline.
///
/// The OTLP exporters use these crates themselves, so exporting their events
/// would generate telemetry about exporting telemetry.
const EXPORT_LOOP_TARGETS: &[&str] = &["opentelemetry", "hyper", "h2", "tonic", "reqwest"];

/// A boxed layer over the bare registry.
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// The subscriber produced by [`subscriber`].
pub type TelemetrySubscriber = Layered<Vec<BoxedLayer>, Registry>;

/// Builds the subscriber for `telemetry`, writing console output to `writer`.
///
/// The subscriber is not installed; use [`tracing::subscriber::set_default`]
/// for a scoped installation or [`Telemetry::install`] for the global one.
pub fn subscriber<W>(telemetry: &Telemetry, config: &TelemetryConfig, writer: W) -> TelemetrySubscriber
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let console = tracing_subscriber::fmt::layer().with_writer(writer);
    let console: BoxedLayer = match config.log_format {
        LogFormat::Text => console.with_filter(console_filter(config)).boxed(),
        LogFormat::Json => console.json().with_filter(console_filter(config)).boxed(),
    };

    let tracer = telemetry
        .tracer_provider()
        .tracer(telemetry.identity().service_name().to_string());
    let spans: BoxedLayer = tracing_opentelemetry::layer()
        .with_tracer(tracer)
        .with_filter(console_filter(config))
        .boxed();

    let logs: BoxedLayer = OpenTelemetryTracingBridge::new(telemetry.logger_provider())
        .with_filter(export_filter(config))
        .boxed();

    tracing_subscriber::registry().with(vec![console, spans, logs])
}

/// Filter for console output and span export.
fn console_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::new(&config.log_filter)
}

/// Filter for the log bridge: the console directives minus the exporter's own crates.
fn export_filter(config: &TelemetryConfig) -> EnvFilter {
    let directives = EXPORT_LOOP_TARGETS
        .iter()
        .fold(config.log_filter.clone(), |acc, target| {
            format!("{acc},{target}=off")
        });
    EnvFilter::new(directives)
}
