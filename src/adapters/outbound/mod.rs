mod dashmap_metrics_registry;
mod prometheus_exporter;

pub use dashmap_metrics_registry::DashMapMetricsRegistry;
pub use prometheus_exporter::PrometheusExporter;
