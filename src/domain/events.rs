//! Invocation lifecycle events consumed by metrics listeners.

use serde::{Deserialize, Serialize};

/// Kind of a lifecycle event; listeners declare exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricsEventKind {
    /// Call entered the wait queue
    InvocationStarted,
    /// Call left the wait queue and began executing
    InvocationStartProcessing,
    /// Call finished executing
    InvocationFinished,
}

/// A lifecycle event for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricsEvent {
    InvocationStarted {
        operation_name: String,
    },
    InvocationStartProcessing {
        operation_name: String,
        /// Time spent waiting in the queue
        in_queue_nanos: u64,
    },
    InvocationFinished {
        operation_name: String,
        /// Time spent executing after leaving the queue
        processing_nanos: u64,
        success: bool,
    },
}

impl MetricsEvent {
    pub fn started(operation_name: impl Into<String>) -> Self {
        Self::InvocationStarted {
            operation_name: operation_name.into(),
        }
    }

    pub fn start_processing(operation_name: impl Into<String>, in_queue_nanos: u64) -> Self {
        Self::InvocationStartProcessing {
            operation_name: operation_name.into(),
            in_queue_nanos,
        }
    }

    pub fn finished(operation_name: impl Into<String>, processing_nanos: u64, success: bool) -> Self {
        Self::InvocationFinished {
            operation_name: operation_name.into(),
            processing_nanos,
            success,
        }
    }

    pub fn kind(&self) -> MetricsEventKind {
        match self {
            Self::InvocationStarted { .. } => MetricsEventKind::InvocationStarted,
            Self::InvocationStartProcessing { .. } => MetricsEventKind::InvocationStartProcessing,
            Self::InvocationFinished { .. } => MetricsEventKind::InvocationFinished,
        }
    }

    pub fn operation_name(&self) -> &str {
        match self {
            Self::InvocationStarted { operation_name }
            | Self::InvocationStartProcessing { operation_name, .. }
            | Self::InvocationFinished { operation_name, .. } => operation_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        assert_eq!(MetricsEvent::started("a").kind(), MetricsEventKind::InvocationStarted);
        assert_eq!(
            MetricsEvent::start_processing("a", 5).kind(),
            MetricsEventKind::InvocationStartProcessing
        );
        assert_eq!(
            MetricsEvent::finished("a", 5, true).kind(),
            MetricsEventKind::InvocationFinished
        );
    }

    #[test]
    fn test_event_operation_name() {
        assert_eq!(MetricsEvent::started("add").operation_name(), "add");
        assert_eq!(MetricsEvent::start_processing("sub", 1).operation_name(), "sub");
        assert_eq!(MetricsEvent::finished("mul", 1, false).operation_name(), "mul");
    }
}
