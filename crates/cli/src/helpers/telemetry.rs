// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use cm_config::AppConfig;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const SERVICE_NAME: &str = "chainmetrics";

/// Install the global subscriber. Logs are written to stderr; stdout is
/// reserved for command output. The returned provider must be shut down
/// before exit to flush pending spans.
pub fn setup_tracing(config: &AppConfig, log_level: Level) -> Result<Option<SdkTracerProvider>> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(log_level);

    match config.otel() {
        Some(endpoint) => {
            let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .with_protocol(Protocol::Grpc)
                .build()?;

            let service_name =
                std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.to_string());
            let resource = Resource::builder().with_service_name(service_name).build();

            let provider = SdkTracerProvider::builder()
                .with_batch_exporter(otlp_exporter)
                .with_resource(resource)
                .build();

            let tracer = provider.tracer(SERVICE_NAME);
            let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);

            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(telemetry)
                .with(level_filter)
                .init();

            Ok(Some(provider))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(level_filter)
                .init();
            Ok(None)
        }
    }
}
