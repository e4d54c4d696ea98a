//! Execution time and outcome counters.

use super::{apply_all, MetricResolver};
use crate::domain::errors::MetricsError;
use crate::domain::events::{MetricsEvent, MetricsEventKind};
use crate::domain::ports::MetricsEventListener;
use crate::domain::value_objects::MetricFamily;

/// Records execution time and counts finished and failed calls.
pub struct InvocationFinishedListener {
    metrics: MetricResolver,
}

impl InvocationFinishedListener {
    pub fn new(metrics: MetricResolver) -> Self {
        Self { metrics }
    }
}

impl MetricsEventListener for InvocationFinishedListener {
    fn concerned_event_kind(&self) -> MetricsEventKind {
        MetricsEventKind::InvocationFinished
    }

    fn on_event(&self, event: &MetricsEvent) -> Result<(), MetricsError> {
        let MetricsEvent::InvocationFinished {
            operation_name,
            processing_nanos,
            success,
        } = event
        else {
            return Ok(());
        };

        let timers = self.metrics.pair(MetricFamily::ExecutionTime, operation_name)?;
        let totals = self.metrics.pair(MetricFamily::TotalCount, operation_name)?;

        let mut result = apply_all(&timers, |m| m.record(*processing_nanos))
            .and(apply_all(&totals, |m| m.update(1)));

        if !success {
            let failed = self.metrics.pair(MetricFamily::FailedCount, operation_name)?;
            result = result.and(apply_all(&failed, |m| m.update(1)));
        }
        result
    }
}
