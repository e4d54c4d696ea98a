//! Prometheus Exporter
//!
//! Renders a metrics registry snapshot in Prometheus text exposition format.

use crate::domain::metric::MetricSnapshot;
use crate::domain::ports::MetricsRegistry;
use std::collections::HashSet;
use std::sync::Arc;

/// Text exporter over any metrics registry.
pub struct PrometheusExporter {
    registry: Arc<dyn MetricsRegistry>,
    /// Constant label attached to every sample (e.g. service name)
    service: String,
}

impl PrometheusExporter {
    pub fn new(registry: Arc<dyn MetricsRegistry>, service: impl Into<String>) -> Self {
        Self {
            registry,
            service: service.into(),
        }
    }

    /// Prometheus metric names allow `[a-zA-Z0-9_:]` only.
    fn sanitize(name: &str) -> String {
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == ':' { c } else { '_' })
            .collect()
    }

    /// Export all metrics in Prometheus text format.
    ///
    /// Timers become a summary (`_sum`, `_count`) plus `_min` and `_max`
    /// gauge families. A metric whose sanitized name was already emitted is
    /// skipped with a warning, so no family is declared twice.
    pub fn export(&self) -> String {
        let mut output = String::new();
        let mut emitted = HashSet::new();

        for snapshot in self.registry.snapshot() {
            let name = Self::sanitize(snapshot.name());
            let mut families = vec![name.clone()];
            if matches!(snapshot, MetricSnapshot::Timer { .. }) {
                families.extend(["sum", "count", "min", "max"].map(|s| format!("{}_{}", name, s)));
            }

            if families.iter().any(|f| emitted.contains(f)) {
                tracing::warn!(
                    "metric {} collides with another metric as {}, not exported",
                    snapshot.name(),
                    name
                );
                continue;
            }
            emitted.extend(families);

            match snapshot {
                MetricSnapshot::Counter { value, .. } => {
                    self.push_gauge(&mut output, &name, value);
                }
                MetricSnapshot::Timer {
                    count,
                    total_nanos,
                    min_nanos,
                    max_nanos,
                    ..
                } => {
                    output.push_str(&format!("# TYPE {} summary\n", name));
                    output.push_str(&format!(
                        "{}_sum{{service=\"{}\"}} {}\n",
                        name, self.service, total_nanos
                    ));
                    output.push_str(&format!(
                        "{}_count{{service=\"{}\"}} {}\n",
                        name, self.service, count
                    ));
                    self.push_gauge(&mut output, &format!("{}_min", name), min_nanos);
                    self.push_gauge(&mut output, &format!("{}_max", name), max_nanos);
                }
            }
        }

        output
    }

    fn push_gauge(&self, output: &mut String, name: &str, value: impl std::fmt::Display) {
        output.push_str(&format!("# TYPE {} gauge\n", name));
        output.push_str(&format!(
            "{}{{service=\"{}\"}} {}\n",
            name, self.service, value
        ));
    }
}
