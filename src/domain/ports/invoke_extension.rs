//! Invoke Extension Port
//!
//! Defines the before/after hook wrapped around handler invocation.

use crate::domain::errors::InvocationError;
use serde_json::Value;
use uuid::Uuid;

/// What hooks can see about the call in flight.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub invocation_id: Uuid,
    pub operation_id: String,
    /// Handler-call arguments, already mapped
    pub arguments: Vec<Value>,
}

impl InvocationContext {
    pub fn new(operation_id: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            operation_id: operation_id.into(),
            arguments,
        }
    }
}

/// How the call ended, as seen by after-hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvocationOutcome<'a> {
    /// Handler returned a result
    Completed(&'a Value),
    /// A before-hook produced the response; the handler did not run
    ShortCircuited(&'a Value),
    /// Handler or a before-hook failed
    Failed(&'a InvocationError),
    /// Dispatch was dropped before it finished
    Cancelled,
}

/// Decision of a before-hook.
#[derive(Debug, Clone, PartialEq)]
pub enum BeforeInvoke {
    /// Continue with the next hook, then the handler
    Proceed,
    /// Skip the handler and the remaining before-hooks, respond with this value
    Respond(Value),
}

/// Cross-cutting behavior around handler invocation.
///
/// Hooks are synchronous so that after-hooks can still run from a drop guard
/// when the dispatch future is cancelled.
pub trait InvokeExtension: Send + Sync {
    /// Name used in logs and faults.
    fn name(&self) -> &str;

    /// Position in the chain; lower runs first. Ties keep registration order.
    fn order(&self) -> i32 {
        0
    }

    fn before_invoke(&self, ctx: &InvocationContext) -> Result<BeforeInvoke, InvocationError>;

    /// Runs exactly once for every call whose `before_invoke` was entered.
    fn after_invoke(&self, ctx: &InvocationContext, outcome: &InvocationOutcome<'_>);
}
