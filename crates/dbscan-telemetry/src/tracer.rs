//! Tracer setup and management

use dbscan_core::{Error, LogFormat, LogRotation, ObservabilityConfig, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{SimpleSpanProcessor, TracerProvider};
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE_PREFIX: &str = "dbscanner";

/// Global tracer provider holder
static TRACER_PROVIDER: OnceLock<TracerProvider> = OnceLock::new();

/// Global span processor builders (registered before initialization)
type ProcessorBuilder = Box<dyn FnOnce() -> SimpleSpanProcessor + Send>;
static SPAN_PROCESSOR_BUILDERS: Mutex<Option<Vec<ProcessorBuilder>>> = Mutex::new(Some(Vec::new()));

/// Register a span processor builder to be used when telemetry is initialized.
///
/// This is how an exporter (OTLP, Jaeger, a test collector) gets attached.
/// Must be called BEFORE `init_telemetry()`.
///
/// # Example
///
/// ```ignore
/// use dbscan_telemetry::{register_span_processor, init_telemetry};
/// use opentelemetry_sdk::trace::SimpleSpanProcessor;
///
/// register_span_processor(Box::new(|| {
///     SimpleSpanProcessor::new(Box::new(/* your exporter */))
/// }));
/// init_telemetry(&config.observability)?;
/// ```
pub fn register_span_processor(builder: ProcessorBuilder) {
    let mut builders = SPAN_PROCESSOR_BUILDERS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(ref mut vec) = *builders {
        vec.push(builder);
    } else {
        tracing::warn!("Attempted to register span processor after telemetry initialization");
    }
}

/// Initialize logging and OpenTelemetry tracing.
///
/// This sets up:
/// - A tracer provider with any registered span processors
/// - Human-readable or JSON log output, per `config.log_format`
/// - A rolling log file when `config.log_dir` is set
/// - Filtering from `RUST_LOG`, falling back to `config.log_level`
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    // Take the span processor builders (can only initialize once)
    let builders = SPAN_PROCESSOR_BUILDERS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .unwrap_or_default();

    let mut provider_builder = TracerProvider::builder();
    for builder in builders {
        provider_builder = provider_builder.with_span_processor(builder());
    }
    let tracer_provider = provider_builder.build();

    let tracer = tracer_provider.tracer(config.service_name.clone());
    let _ = TRACER_PROVIDER.set(tracer_provider);

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_line_number(true)
            .boxed(),
    };

    let file_layer = file_appender(config)?.map(|appender| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(appender)
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(file_layer)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(filter)
        .init();

    Ok(())
}

/// Flush and stop the tracer provider. Call once, on the way out.
pub fn shutdown_telemetry() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "Failed to shut down tracer provider");
        }
    }
}

/// The rolling log file writer, if a log directory is configured
fn file_appender(config: &ObservabilityConfig) -> Result<Option<RollingFileAppender>> {
    let Some(dir) = &config.log_dir else {
        return Ok(None);
    };

    let rotation = match config.log_rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    };

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(config.log_max_files)
        .build(dir)
        .map(Some)
        .map_err(|e| {
            Error::config_error(format!("cannot open log directory {}: {e}", dir.display()))
        })
}
