use color_eyre::Result;
use color_eyre::eyre::Context;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Log lines go to stderr, stdout belongs to
/// the prompts and results.
///
/// With an `otlp_endpoint` spans are also exported over gRPC, the returned
/// provider has to be passed to [`shutdown_tracing`] before exit.
pub fn init_tracing(
    service_name: &str,
    otlp_endpoint: Option<&str>,
    level: &str,
) -> Result<Option<SdkTracerProvider>> {
    let tracer_provider = otlp_endpoint
        .map(|endpoint| otlp_tracer_provider(service_name, endpoint))
        .transpose()?;

    let telemetry_layer = tracer_provider.as_ref().map(|provider| {
        opentelemetry::global::set_tracer_provider(provider.clone());
        tracing_opentelemetry::layer()
            .with_tracer(opentelemetry::global::tracer(service_name.to_string()))
    });

    tracing_subscriber::registry()
        .with(level_filter(level)?)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(telemetry_layer)
        .try_init()
        .wrap_err("A tracing subscriber is already installed")?;

    Ok(tracer_provider)
}

fn level_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).wrap_err_with(|| format!("Invalid log level `{level}`"))
}

fn otlp_tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .wrap_err_with(|| format!("Failed to create OTLP span exporter for {endpoint}"))?;

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new(SERVICE_NAME, service_name.to_string()),
            KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        ])
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

/// Flush pending spans.
pub fn shutdown_tracing(tracer_provider: Option<SdkTracerProvider>) {
    let Some(provider) = tracer_provider else {
        return;
    };
    if let Err(error) = provider.shutdown() {
        eprintln!("Failed to flush spans: {error}");
    }
}
