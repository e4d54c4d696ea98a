//! Metrics Registry Port
//!
//! Defines the interface for the process-wide store of named metrics.

use crate::domain::metric::{Metric, MetricSnapshot};
use std::sync::Arc;

/// Concurrent get-or-create store of named metrics.
///
/// At most one metric exists per name. All mutation goes through
/// [`get_or_create_metric`](Self::get_or_create_metric) and the per-metric
/// update operations; callers never lock the whole registry.
pub trait MetricsRegistry: Send + Sync {
    /// Non-creating lookup.
    fn get_metric(&self, name: &str) -> Option<Arc<Metric>>;

    /// Install `metric` unless one with the same name exists.
    ///
    /// Returns the winning instance. When creators race on one name, exactly
    /// one constructed metric is installed and every caller receives it; the
    /// losers are dropped without being observed.
    fn get_or_create_metric(&self, metric: Metric) -> Arc<Metric>;

    /// Names of all registered metrics.
    fn metric_names(&self) -> Vec<String>;

    /// Point-in-time copy of every metric, sorted by name.
    fn snapshot(&self) -> Vec<MetricSnapshot>;
}
