//! Tracing and APM Setup
//!
//! Wires tracing-subscriber and OpenTelemetry to a Datadog agent so
//! spans created by the hook land in APM. Must be called from within a
//! Tokio runtime (the exporter batches on it).

use opentelemetry_datadog::DatadogPropagator;
use opentelemetry_sdk::trace::Sampler;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::TelemetryConfig;
use crate::hook::BoxError;

/// Guard over the installed tracer provider.
///
/// Call [`Telemetry::shutdown`] before exit to flush pending spans;
/// dropping the guard without it flushes too.
#[must_use = "dropping the guard immediately shuts tracing down"]
pub struct Telemetry {
    flushed: bool,
}

impl Telemetry {
    /// Flush pending spans to the agent and tear the pipeline down.
    pub fn shutdown(mut self) {
        self.flush();
    }

    fn flush(&mut self) {
        if self.flushed {
            return;
        }
        self.flushed = true;
        opentelemetry::global::shutdown_tracer_provider();
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Install the Datadog exporter pipeline and a tracing subscriber.
///
/// Sets the global propagator, builds a batch exporter against the
/// configured agent, and registers a subscriber combining an `EnvFilter`,
/// an fmt layer, and the OpenTelemetry bridge layer.
pub fn init(config: &TelemetryConfig) -> Result<Telemetry, BoxError> {
    opentelemetry::global::set_text_map_propagator(DatadogPropagator::default());

    let mut resource_attrs = vec![
        opentelemetry::KeyValue::new("service.name", config.service_name.clone()),
        opentelemetry::KeyValue::new("service.version", config.version.clone()),
        opentelemetry::KeyValue::new("deployment.environment", config.env.clone()),
    ];
    for (key, value) in &config.tags {
        resource_attrs.push(opentelemetry::KeyValue::new(key.clone(), value.clone()));
    }

    let tracer = opentelemetry_datadog::new_pipeline()
        .with_service_name(&config.service_name)
        .with_agent_endpoint(&config.trace_addr)
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::TraceIdRatioBased(config.trace_sample_rate))
                .with_resource(opentelemetry_sdk::Resource::new(resource_attrs)),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    tracing::info!(
        service = %config.service_name,
        env = %config.env,
        version = %config.version,
        sample_rate = %config.trace_sample_rate,
        "telemetry initialized"
    );

    Ok(Telemetry { flushed: false })
}
