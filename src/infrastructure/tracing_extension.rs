//! Tracing Extension
//!
//! Logs every invocation with its id, outcome and elapsed time.

use crate::domain::errors::InvocationError;
use crate::domain::ports::{BeforeInvoke, InvocationContext, InvocationOutcome, InvokeExtension};
use dashmap::DashMap;
use std::time::Instant;
use uuid::Uuid;

/// Stock hook that logs before and after each handler call.
///
/// Runs first in the chain by default so its timing covers the other hooks.
pub struct TracingExtension {
    order: i32,
    /// Start time of calls in flight
    started: DashMap<Uuid, Instant>,
}

impl TracingExtension {
    pub fn new() -> Self {
        Self::with_order(i32::MIN)
    }

    pub fn with_order(order: i32) -> Self {
        Self {
            order,
            started: DashMap::new(),
        }
    }

    /// Number of calls whose after-hook has not run yet.
    pub fn in_flight(&self) -> usize {
        self.started.len()
    }
}

impl Default for TracingExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl InvokeExtension for TracingExtension {
    fn name(&self) -> &str {
        "tracing"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn before_invoke(&self, ctx: &InvocationContext) -> Result<BeforeInvoke, InvocationError> {
        self.started.insert(ctx.invocation_id, Instant::now());
        tracing::debug!(
            "-> {} [{}] with {} arguments",
            ctx.operation_id,
            ctx.invocation_id,
            ctx.arguments.len()
        );
        Ok(BeforeInvoke::Proceed)
    }

    fn after_invoke(&self, ctx: &InvocationContext, outcome: &InvocationOutcome<'_>) {
        let elapsed = self
            .started
            .remove(&ctx.invocation_id)
            .map(|(_, start)| start.elapsed())
            .unwrap_or_default();

        match outcome {
            InvocationOutcome::Completed(_) => {
                tracing::debug!("<- {} [{}] ok in {:?}", ctx.operation_id, ctx.invocation_id, elapsed)
            }
            InvocationOutcome::ShortCircuited(_) => tracing::debug!(
                "<- {} [{}] short-circuited in {:?}",
                ctx.operation_id,
                ctx.invocation_id,
                elapsed
            ),
            InvocationOutcome::Failed(error) => tracing::info!(
                "<- {} [{}] failed in {:?}: {}",
                ctx.operation_id,
                ctx.invocation_id,
                elapsed,
                error
            ),
            InvocationOutcome::Cancelled => tracing::info!(
                "<- {} [{}] cancelled after {:?}",
                ctx.operation_id,
                ctx.invocation_id,
                elapsed
            ),
        }
    }
}
