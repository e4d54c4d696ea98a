//! Invoke Extension Chain
//!
//! Ordered list of hooks wrapped around one handler call. Before-hooks run
//! in chain order; after-hooks run in exact reverse order for every hook
//! whose before-hook was entered, including when the call is cancelled.

use crate::domain::errors::InvocationError;
use crate::domain::ports::{BeforeInvoke, InvocationContext, InvocationOutcome, InvokeExtension};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Result of running the before-hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum BeforeOutcome {
    /// Every hook proceeded; invoke the handler
    Proceed,
    /// A hook produced the response directly
    ShortCircuit { extension: String, response: Value },
    /// A hook failed or panicked
    Failed {
        extension: String,
        error: InvocationError,
    },
}

/// Statically composed, ordered hook list.
#[derive(Clone, Default)]
pub struct InvokeExtensionChain {
    extensions: Vec<Arc<dyn InvokeExtension>>,
}

impl InvokeExtensionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook (builder style).
    pub fn with(mut self, extension: Arc<dyn InvokeExtension>) -> Self {
        self.push(extension);
        self
    }

    /// Add a hook, keeping the chain sorted by `order()`.
    ///
    /// The sort is stable, so hooks with equal order keep registration order.
    pub fn push(&mut self, extension: Arc<dyn InvokeExtension>) {
        self.extensions.push(extension);
        self.extensions.sort_by_key(|e| e.order());
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Hook names in execution order.
    pub fn names(&self) -> Vec<String> {
        self.extensions.iter().map(|e| e.name().to_string()).collect()
    }

    /// Run before-hooks in order and return a scope owning the after-hooks.
    ///
    /// The scope must be finished with the call outcome; if it is dropped
    /// instead, the entered after-hooks run with [`InvocationOutcome::Cancelled`].
    pub fn enter<'a>(&'a self, ctx: &'a InvocationContext) -> (InvocationScope<'a>, BeforeOutcome) {
        let mut scope = InvocationScope {
            extensions: &self.extensions,
            ctx,
            entered: 0,
            finished: false,
        };

        for extension in &self.extensions {
            scope.entered += 1;

            let result = catch_unwind(AssertUnwindSafe(|| extension.before_invoke(ctx)));
            let outcome = match result {
                Ok(Ok(BeforeInvoke::Proceed)) => continue,
                Ok(Ok(BeforeInvoke::Respond(response))) => {
                    tracing::debug!(
                        "extension {} short-circuited {}",
                        extension.name(),
                        ctx.operation_id
                    );
                    BeforeOutcome::ShortCircuit {
                        extension: extension.name().to_string(),
                        response,
                    }
                }
                Ok(Err(error)) => BeforeOutcome::Failed {
                    extension: extension.name().to_string(),
                    error,
                },
                Err(_) => BeforeOutcome::Failed {
                    extension: extension.name().to_string(),
                    error: InvocationError::internal(format!(
                        "extension {} panicked",
                        extension.name()
                    )),
                },
            };
            return (scope, outcome);
        }

        (scope, BeforeOutcome::Proceed)
    }
}

impl std::fmt::Debug for InvokeExtensionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvokeExtensionChain")
            .field("extensions", &self.names())
            .finish()
    }
}

/// After-hook obligations for one call.
pub struct InvocationScope<'a> {
    extensions: &'a [Arc<dyn InvokeExtension>],
    ctx: &'a InvocationContext,
    /// Number of hooks whose before-hook was entered
    entered: usize,
    finished: bool,
}

impl InvocationScope<'_> {
    pub fn entered(&self) -> usize {
        self.entered
    }

    /// Run the entered after-hooks in reverse order with the call outcome.
    pub fn finish(mut self, outcome: &InvocationOutcome<'_>) {
        self.run_after(outcome);
    }

    fn run_after(&mut self, outcome: &InvocationOutcome<'_>) {
        if self.finished {
            return;
        }
        self.finished = true;

        let ctx = self.ctx;
        let entered = self.entered.min(self.extensions.len());
        for extension in self.extensions[..entered].iter().rev() {
            let result = catch_unwind(AssertUnwindSafe(|| extension.after_invoke(ctx, outcome)));
            if result.is_err() {
                tracing::error!(
                    "after hook of extension {} panicked for {} ({})",
                    extension.name(),
                    ctx.operation_id,
                    ctx.invocation_id
                );
            }
        }
    }
}

impl Drop for InvocationScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                "invocation {} of {} dropped before completion",
                self.ctx.invocation_id,
                self.ctx.operation_id
            );
            self.run_after(&InvocationOutcome::Cancelled);
        }
    }
}
