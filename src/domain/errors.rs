//! Domain Errors
//!
//! Bind-time errors abort service registration. Per-call errors become a
//! [`Fault`] value returned from dispatch. Metrics errors are reported by
//! listeners and never reach the invocation they measure.

use crate::domain::value_objects::MetricKind;
use serde::Serialize;
use uuid::Uuid;

/// Errors raised while binding a contract operation to a handler method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// Contract parameter has no handler mapping and is not a body parameter.
    #[error("operation {operation_id}: contract parameter `{parameter}` has no handler mapping")]
    BindingMismatch {
        operation_id: String,
        parameter: String,
    },

    /// Handler parameter maps to no contract parameter and no wrapped body.
    #[error("operation {operation_id}: handler parameter `{parameter}` maps to no contract parameter")]
    UnmappedHandlerParameter {
        operation_id: String,
        parameter: String,
    },

    /// Two handler parameters share one contract-visible name.
    #[error("operation {operation_id}: handler parameter name `{parameter}` is declared twice")]
    DuplicateHandlerParameter {
        operation_id: String,
        parameter: String,
    },

    /// Name is not declared by the contract operation.
    #[error("operation {operation_id}: parameter `{name}` is not declared in the contract")]
    UnknownParameter { operation_id: String, name: String },

    /// Binding was built without an arguments or response mapper.
    #[error("operation {operation_id}: no {mapper} mapper configured")]
    MissingMapper {
        operation_id: String,
        mapper: &'static str,
    },

    /// Operation id already registered.
    #[error("operation {0} is already registered")]
    DuplicateOperation(String),
}

/// Error produced by a handler, hook or mapper during one call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct InvocationError {
    /// Wire status suggested to the transport
    pub status: u16,
    pub message: String,
}

impl InvocationError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Caller sent something the operation cannot accept.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    /// Something failed on the serving side.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }
}

impl From<BindingError> for InvocationError {
    fn from(e: BindingError) -> Self {
        Self::internal(e.to_string())
    }
}

/// Stage of the invocation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    UnknownOperation,
    ArgumentMapping,
    Handler,
    Extension,
    ResponseMapping,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownOperation => write!(f, "unknown operation"),
            Self::ArgumentMapping => write!(f, "argument mapping"),
            Self::Handler => write!(f, "handler"),
            Self::Extension => write!(f, "extension"),
            Self::ResponseMapping => write!(f, "response mapping"),
        }
    }
}

/// Structured failure returned from dispatch instead of a panic.
///
/// Carries enough to build a wire-level error response without knowing
/// anything about the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} fault in {operation_id}: {message}")]
pub struct Fault {
    pub kind: FaultKind,
    pub operation_id: String,
    /// Absent when the operation could not be found
    pub invocation_id: Option<Uuid>,
    pub status: u16,
    pub message: String,
}

impl Fault {
    pub fn unknown_operation(operation_id: &str) -> Self {
        Self {
            kind: FaultKind::UnknownOperation,
            operation_id: operation_id.to_string(),
            invocation_id: None,
            status: 404,
            message: format!("operation {} is not registered", operation_id),
        }
    }

    pub fn from_error(
        kind: FaultKind,
        operation_id: &str,
        invocation_id: Uuid,
        error: InvocationError,
    ) -> Self {
        Self {
            kind,
            operation_id: operation_id.to_string(),
            invocation_id: Some(invocation_id),
            status: error.status,
            message: error.message,
        }
    }
}

/// Errors on the metrics path.
///
/// These indicate a naming collision between two logically distinct metrics
/// or an unpaired update, never a user error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    #[error("metric {name} is a {actual}, cannot apply a {expected} update")]
    KindMismatch {
        name: String,
        expected: MetricKind,
        actual: MetricKind,
    },

    #[error("counter {name} would drop below zero")]
    Underflow { name: String },

    /// Operation name would collide with the aggregate or split a metric name.
    #[error("operation name `{operation}` cannot be used in metric names: {reason}")]
    InvalidOperationName {
        operation: String,
        reason: &'static str,
    },
}
