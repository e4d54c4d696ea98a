//! Dequeue side of the queue gauges.

use super::{apply_all, MetricResolver};
use crate::domain::errors::MetricsError;
use crate::domain::events::{MetricsEvent, MetricsEventKind};
use crate::domain::ports::MetricsEventListener;
use crate::domain::value_objects::MetricFamily;

/// Handles a call leaving the wait queue.
///
/// Decrements the per-operation and aggregate "in queue" counters and
/// records the time spent queued into both queue-latency timers. Each
/// decrement must pair with an earlier arrival; an unpaired one is refused
/// with [`MetricsError::Underflow`] instead of driving a counter negative.
pub struct QueueDepartureListener {
    metrics: MetricResolver,
}

impl QueueDepartureListener {
    pub fn new(metrics: MetricResolver) -> Self {
        Self { metrics }
    }
}

impl MetricsEventListener for QueueDepartureListener {
    fn concerned_event_kind(&self) -> MetricsEventKind {
        MetricsEventKind::InvocationStartProcessing
    }

    fn on_event(&self, event: &MetricsEvent) -> Result<(), MetricsError> {
        let MetricsEvent::InvocationStartProcessing {
            operation_name,
            in_queue_nanos,
        } = event
        else {
            return Ok(());
        };

        tracing::debug!("{} left queue after {}ns", operation_name, in_queue_nanos);

        let counters = self.metrics.pair(MetricFamily::CountInQueue, operation_name)?;
        let timers = self.metrics.pair(MetricFamily::LifeTimeInQueue, operation_name)?;

        let decremented = apply_all(&counters, |m| m.decrement());
        let recorded = apply_all(&timers, |m| m.record(*in_queue_nanos));
        decremented.and(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::DashMapMetricsRegistry;
    use crate::domain::metric::{Metric, MetricFactory, MetricSnapshot};
    use crate::domain::ports::MetricsRegistry;
    use crate::domain::value_objects::MetricNames;
    use std::sync::Arc;

    fn setup() -> (Arc<DashMapMetricsRegistry>, QueueDepartureListener) {
        let registry = Arc::new(DashMapMetricsRegistry::new());
        let listener = QueueDepartureListener::new(MetricResolver::new(
            registry.clone(),
            MetricFactory::new(),
            MetricNames::default(),
        ));
        (registry, listener)
    }

    fn timer_count(registry: &DashMapMetricsRegistry, name: &str) -> (u64, u64) {
        match registry.get_metric(name).unwrap().snapshot() {
            MetricSnapshot::Timer {
                count, total_nanos, ..
            } => (count, total_nanos),
            other => panic!("expected timer, got {:?}", other),
        }
    }

    #[test]
    fn test_departure_updates_operation_and_aggregate() {
        let (registry, listener) = setup();
        registry
            .get_or_create_metric(Metric::counter("invocation.add.queue.count_in_queue"))
            .update(5)
            .unwrap();
        registry
            .get_or_create_metric(Metric::counter("invocation.instance.queue.count_in_queue"))
            .update(20)
            .unwrap();

        listener
            .on_event(&MetricsEvent::start_processing("add", 1_500))
            .unwrap();

        let count = |name: &str| registry.get_metric(name).and_then(|m| m.count_value());
        assert_eq!(count("invocation.add.queue.count_in_queue"), Some(4));
        assert_eq!(count("invocation.instance.queue.count_in_queue"), Some(19));
        assert_eq!(
            timer_count(&registry, "invocation.add.queue.life_time_in_queue"),
            (1, 1_500)
        );
        assert_eq!(
            timer_count(&registry, "invocation.instance.queue.life_time_in_queue"),
            (1, 1_500)
        );
    }

    #[test]
    fn test_subsequent_events_reuse_metrics() {
        let (registry, listener) = setup();
        registry
            .get_or_create_metric(Metric::counter("invocation.add.queue.count_in_queue"))
            .update(2)
            .unwrap();
        registry
            .get_or_create_metric(Metric::counter("invocation.instance.queue.count_in_queue"))
            .update(2)
            .unwrap();

        listener.on_event(&MetricsEvent::start_processing("add", 10)).unwrap();
        let timer = registry
            .get_metric("invocation.add.queue.life_time_in_queue")
            .unwrap();
        listener.on_event(&MetricsEvent::start_processing("add", 30)).unwrap();

        assert!(Arc::ptr_eq(
            &timer,
            &registry.get_metric("invocation.add.queue.life_time_in_queue").unwrap()
        ));
        assert_eq!(
            timer_count(&registry, "invocation.add.queue.life_time_in_queue"),
            (2, 40)
        );
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_unpaired_departure_underflows_but_records_latency() {
        let (registry, listener) = setup();

        let err = listener
            .on_event(&MetricsEvent::start_processing("add", 7))
            .unwrap_err();
        assert!(matches!(err, MetricsError::Underflow { .. }));

        let count = registry
            .get_metric("invocation.add.queue.count_in_queue")
            .and_then(|m| m.count_value());
        assert_eq!(count, Some(0));
        assert_eq!(
            timer_count(&registry, "invocation.add.queue.life_time_in_queue"),
            (1, 7)
        );
    }

    #[test]
    fn test_kind_collision_reported() {
        let (registry, listener) = setup();
        registry.get_or_create_metric(Metric::timer("invocation.add.queue.count_in_queue"));
        registry
            .get_or_create_metric(Metric::counter("invocation.instance.queue.count_in_queue"))
            .update(1)
            .unwrap();

        let err = listener
            .on_event(&MetricsEvent::start_processing("add", 7))
            .unwrap_err();
        assert!(matches!(err, MetricsError::KindMismatch { .. }));
        assert_eq!(
            registry
                .get_metric("invocation.instance.queue.count_in_queue")
                .and_then(|m| m.count_value()),
            Some(0)
        );
    }

    #[test]
    fn test_custom_names() {
        let registry = Arc::new(DashMapMetricsRegistry::new());
        let listener = QueueDepartureListener::new(MetricResolver::new(
            registry.clone(),
            MetricFactory::new(),
            MetricNames::new("svc", "all"),
        ));
        registry
            .get_or_create_metric(Metric::counter("svc.add.queue.count_in_queue"))
            .update(1)
            .unwrap();
        registry
            .get_or_create_metric(Metric::counter("svc.all.queue.count_in_queue"))
            .update(1)
            .unwrap();

        listener.on_event(&MetricsEvent::start_processing("add", 3)).unwrap();
        assert!(registry.get_metric("svc.all.queue.life_time_in_queue").is_some());
    }
}
