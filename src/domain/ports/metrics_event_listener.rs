//! Metrics Event Listener Port
//!
//! Defines the per-listener contract for lifecycle events.

use crate::domain::errors::MetricsError;
use crate::domain::events::{MetricsEvent, MetricsEventKind};

/// Reacts to one kind of lifecycle event and updates the metrics it owns.
pub trait MetricsEventListener: Send + Sync {
    /// The single event kind this listener handles.
    fn concerned_event_kind(&self) -> MetricsEventKind;

    /// Process an event of the concerned kind.
    ///
    /// Errors signal a metrics programming error (naming collision or an
    /// unpaired update). The caller reports them; they must not affect the
    /// invocation being measured.
    fn on_event(&self, event: &MetricsEvent) -> Result<(), MetricsError>;
}
