//! Enqueue side of the queue gauges.

use super::{apply_all, MetricResolver};
use crate::domain::errors::MetricsError;
use crate::domain::events::{MetricsEvent, MetricsEventKind};
use crate::domain::ports::MetricsEventListener;
use crate::domain::value_objects::MetricFamily;

/// Counts a call into the per-operation and aggregate "in queue" counters.
pub struct QueueArrivalListener {
    metrics: MetricResolver,
}

impl QueueArrivalListener {
    pub fn new(metrics: MetricResolver) -> Self {
        Self { metrics }
    }
}

impl MetricsEventListener for QueueArrivalListener {
    fn concerned_event_kind(&self) -> MetricsEventKind {
        MetricsEventKind::InvocationStarted
    }

    fn on_event(&self, event: &MetricsEvent) -> Result<(), MetricsError> {
        let MetricsEvent::InvocationStarted { operation_name } = event else {
            return Ok(());
        };

        tracing::debug!("{} entered queue", operation_name);
        let counters = self.metrics.pair(MetricFamily::CountInQueue, operation_name)?;
        apply_all(&counters, |m| m.update(1))
    }
}
