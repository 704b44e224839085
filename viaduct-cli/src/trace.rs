//! Tracing/telemetry setup: a plain `fmt` subscriber by default, or a full
//! OTLP exporter pipeline when `OTEL_EXPORTER_OTLP_ENDPOINT` is set in the
//! environment.

use rama::core::error::BoxError;
use rama::core::telemetry::{
    opentelemetry::{
        KeyValue,
        sdk::{Resource, trace::SdkTracerProvider},
        trace::TracerProvider,
    },
    tracing::{self, layer},
};
use std::io::IsTerminal as _;
use tracing_subscriber::{EnvFilter, filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize global tracing, picking the OTLP path when the environment
/// asks for it and falling back to plain `fmt` logging otherwise.
pub fn init_tracing(default_directive: impl Into<Directive>) -> Result<(), BoxError> {
    if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        init_structured(default_directive)?;
        tracing::trace!("structured (OTEL) tracing init complete");
    } else {
        init_default(default_directive);
        tracing::trace!("default tracing init complete");
    }
    Ok(())
}

fn init_default(default_directive: impl Into<Directive>) {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::builder().with_default_directive(default_directive.into()).from_env_lossy())
        .init();
}

fn init_structured(default_directive: impl Into<Directive>) -> Result<(), BoxError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_attribute(KeyValue::new("service.name", "viaduct")).build())
        .build();

    let tracer = provider.tracer("viaduct-cli");
    let telemetry = layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(telemetry)
        .with(
            tracing_subscriber::fmt::Layer::new()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .json()
                .flatten_event(true),
        )
        .with(EnvFilter::builder().with_default_directive(default_directive.into()).from_env_lossy())
        .init();

    Ok(())
}
