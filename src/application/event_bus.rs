//! Metrics Event Bus
//!
//! Routes lifecycle events to the listeners that declared their kind.

use crate::domain::events::{MetricsEvent, MetricsEventKind};
use crate::domain::ports::MetricsEventListener;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// In-process fan-out of lifecycle events.
///
/// Listener failures and panics are logged and counted here; publishers
/// never see them.
#[derive(Default)]
pub struct MetricsEventBus {
    listeners: RwLock<HashMap<MetricsEventKind, Vec<Arc<dyn MetricsEventListener>>>>,
    /// Listener errors since creation
    failures: AtomicU64,
}

impl MetricsEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to the kind it declares.
    pub fn register(&self, listener: Arc<dyn MetricsEventListener>) {
        let kind = listener.concerned_event_kind();
        tracing::debug!("listener registered for {:?}", kind);
        self.listeners.write().entry(kind).or_default().push(listener);
    }

    /// Number of listeners for one event kind.
    pub fn listener_count(&self, kind: MetricsEventKind) -> usize {
        self.listeners.read().get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event to every matching listener.
    ///
    /// # Returns
    /// Number of listeners that handled the event without error.
    pub fn publish(&self, event: &MetricsEvent) -> usize {
        // Clone out so listeners run without holding the lock
        let listeners = match self.listeners.read().get(&event.kind()) {
            Some(listeners) => listeners.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for listener in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(
                        "metrics listener failed on {:?} for {}: {}",
                        event.kind(),
                        event.operation_name(),
                        e
                    );
                }
                Err(_) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(
                        "metrics listener panicked on {:?} for {}",
                        event.kind(),
                        event.operation_name()
                    );
                }
            }
        }
        delivered
    }

    /// Listener errors observed so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
