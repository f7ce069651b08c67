use opentelemetry::sdk::{trace::Tracer, Resource};
use opentelemetry_otlp::WithExportConfig;
use tonic::metadata::MetadataMap;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_VAR: &str = "LOG";
const DEFAULT_FILTER: &str = "info";
const HONEYCOMB_ENDPOINT: &str = "api.honeycomb.io:443";

/// Where to export spans, when a Honeycomb team is configured.
pub struct HoneycombConfig {
    pub team: String,
    pub dataset: String,
}

impl HoneycombConfig {
    fn metadata(&self) -> Result<MetadataMap, eyre::Report> {
        let mut metadata = MetadataMap::new();
        metadata.insert("x-honeycomb-team", self.team.parse()?);
        Ok(metadata)
    }

    fn install(self) -> Result<Tracer, eyre::Report> {
        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(HONEYCOMB_ENDPOINT)
            .with_metadata(self.metadata()?);

        let resource = Resource::new(vec![opentelemetry::KeyValue::new(
            "service.name",
            self.dataset,
        )]);

        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_trace_config(opentelemetry::sdk::trace::config().with_resource(resource))
            .with_exporter(exporter)
            .install_batch(opentelemetry::runtime::TokioCurrentThread)?;
        Ok(tracer)
    }
}

/// Flushes exported spans when dropped.
#[must_use]
pub struct TracingGuard {
    exporting: bool,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if self.exporting {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

/// Build the filter from `directives`, falling back to the default level when they are
/// missing or do not parse.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber: bunyan JSON lines to `console_sink`, plus span export
/// to Honeycomb when configured.
pub fn configure<W>(
    service: impl Into<String>,
    console_sink: W,
    honeycomb: Option<HoneycombConfig>,
) -> Result<TracingGuard, eyre::Report>
where
    W: for<'a> MakeWriter<'a> + 'static + Send + Sync,
{
    LogTracer::builder()
        .ignore_crate("rustls")
        .with_max_level(log::LevelFilter::Debug)
        .init()?;

    let directives = std::env::var(LOG_FILTER_VAR).ok();
    let subscriber = Registry::default()
        .with(log_filter(directives.as_deref()))
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(service.into(), console_sink));

    let exporting = honeycomb.is_some();
    match honeycomb {
        Some(honeycomb) => {
            let telemetry = tracing_opentelemetry::layer().with_tracer(honeycomb.install()?);
            set_global_default(subscriber.with(telemetry))?;
        }
        None => set_global_default(subscriber)?,
    }

    Ok(TracingGuard { exporting })
}
