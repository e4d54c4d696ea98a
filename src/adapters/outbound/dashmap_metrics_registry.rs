//! DashMap Metrics Registry
//!
//! Implements MetricsRegistry using DashMap for sharded concurrent access.

use crate::domain::metric::{Metric, MetricSnapshot};
use crate::domain::ports::MetricsRegistry;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

/// DashMap-backed metrics registry.
///
/// Get-or-create goes through the entry API, which holds only the shard
/// lock for the key being inserted; unrelated metrics never serialize.
pub struct DashMapMetricsRegistry {
    metrics: DashMap<String, Arc<Metric>>,
}

impl DashMapMetricsRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            metrics: DashMap::new(),
        }
    }

    /// Process-wide registry, created on first use.
    pub fn global() -> Arc<DashMapMetricsRegistry> {
        static GLOBAL: OnceLock<Arc<DashMapMetricsRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(DashMapMetricsRegistry::new()))
            .clone()
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl Default for DashMapMetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry for DashMapMetricsRegistry {
    fn get_metric(&self, name: &str) -> Option<Arc<Metric>> {
        self.metrics.get(name).map(|e| e.value().clone())
    }

    fn get_or_create_metric(&self, metric: Metric) -> Arc<Metric> {
        self.metrics
            .entry(metric.name().to_string())
            .or_insert_with(|| {
                tracing::debug!("registered {} {}", metric.kind(), metric.name());
                Arc::new(metric)
            })
            .value()
            .clone()
    }

    fn metric_names(&self) -> Vec<String> {
        self.metrics.iter().map(|e| e.key().clone()).collect()
    }

    fn snapshot(&self) -> Vec<MetricSnapshot> {
        let mut snapshots: Vec<MetricSnapshot> =
            self.metrics.iter().map(|e| e.value().snapshot()).collect();
        snapshots.sort_by(|a, b| a.name().cmp(b.name()));
        snapshots
    }
}
