//! Metrics event listeners
//!
//! One listener per lifecycle event kind. Each keeps a per-operation metric
//! and an aggregate metric rolled under the configured aggregate key.

mod invocation_finished;
mod queue_arrival;
mod queue_departure;

pub use invocation_finished::InvocationFinishedListener;
pub use queue_arrival::QueueArrivalListener;
pub use queue_departure::QueueDepartureListener;

use crate::domain::errors::MetricsError;
use crate::domain::metric::{Metric, MetricFactory};
use crate::domain::ports::MetricsRegistry;
use crate::domain::value_objects::{MetricFamily, MetricNames};
use std::sync::Arc;

/// Registry access shared by the listeners.
#[derive(Clone)]
pub struct MetricResolver {
    registry: Arc<dyn MetricsRegistry>,
    factory: MetricFactory,
    names: MetricNames,
}

impl MetricResolver {
    pub fn new(registry: Arc<dyn MetricsRegistry>, factory: MetricFactory, names: MetricNames) -> Self {
        Self {
            registry,
            factory,
            names,
        }
    }

    pub fn names(&self) -> &MetricNames {
        &self.names
    }

    /// Existing metric by name, created with the family's kind on first use.
    fn resolve(&self, family: MetricFamily, name: String) -> Arc<Metric> {
        if let Some(metric) = self.registry.get_metric(&name) {
            return metric;
        }
        self.registry
            .get_or_create_metric(self.factory.create(family.kind(), name))
    }

    /// Per-operation and aggregate metrics of one family.
    ///
    /// An operation named like the aggregate key, or containing `.`, would
    /// share or split the aggregate's metric names and is refused.
    pub fn pair(&self, family: MetricFamily, operation: &str) -> Result<[Arc<Metric>; 2], MetricsError> {
        self.check_operation(operation)?;
        Ok([
            self.resolve(family, self.names.operation(family, operation)),
            self.resolve(family, self.names.aggregate(family)),
        ])
    }

    fn check_operation(&self, operation: &str) -> Result<(), MetricsError> {
        let reason = if operation == self.names.aggregate_key() {
            "reserved for the aggregate"
        } else if operation.contains('.') {
            "contains '.'"
        } else if operation.is_empty() {
            "empty"
        } else {
            return Ok(());
        };

        Err(MetricsError::InvalidOperationName {
            operation: operation.to_string(),
            reason,
        })
    }
}

/// Apply `update` to every metric, keeping the first error.
///
/// Later metrics are still updated when an earlier one fails.
fn apply_all<F>(metrics: &[Arc<Metric>], update: F) -> Result<(), MetricsError>
where
    F: Fn(&Metric) -> Result<(), MetricsError>,
{
    let mut first_error = None;
    for metric in metrics {
        if let Err(e) = update(metric) {
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::DashMapMetricsRegistry;

    fn resolver(registry: &Arc<DashMapMetricsRegistry>) -> MetricResolver {
        MetricResolver::new(registry.clone(), MetricFactory::new(), MetricNames::default())
    }

    #[test]
    fn test_pair_returns_distinct_metrics() {
        let registry = Arc::new(DashMapMetricsRegistry::new());
        let [op, aggregate] = resolver(&registry)
            .pair(MetricFamily::CountInQueue, "add")
            .unwrap();

        assert!(!Arc::ptr_eq(&op, &aggregate));
        assert_eq!(op.name(), "invocation.add.queue.count_in_queue");
        assert_eq!(aggregate.name(), "invocation.instance.queue.count_in_queue");
    }

    #[test]
    fn test_pair_rejects_aggregate_key() {
        let registry = Arc::new(DashMapMetricsRegistry::new());
        let err = resolver(&registry)
            .pair(MetricFamily::CountInQueue, "instance")
            .unwrap_err();

        assert!(matches!(err, MetricsError::InvalidOperationName { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pair_rejects_dotted_and_empty_names() {
        let registry = Arc::new(DashMapMetricsRegistry::new());
        let resolver = resolver(&registry);

        assert!(resolver.pair(MetricFamily::TotalCount, "a.b").is_err());
        assert!(resolver.pair(MetricFamily::TotalCount, "").is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_custom_aggregate_key_frees_default() {
        let registry = Arc::new(DashMapMetricsRegistry::new());
        let resolver = MetricResolver::new(registry.clone(), MetricFactory::new(), MetricNames::new("svc", "all"));

        assert!(resolver.pair(MetricFamily::TotalCount, "instance").is_ok());
        assert!(resolver.pair(MetricFamily::TotalCount, "all").is_err());
    }
}
