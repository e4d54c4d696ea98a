//! Dispatcher - Main application use case
//!
//! Routes `(operation id, raw arguments)` to the bound handler: maps the
//! arguments, runs the extension chain around the handler call, and maps
//! the result into the wire response.

use crate::domain::binding::OperationBinding;
use crate::domain::errors::{BindingError, Fault, FaultKind, InvocationError};
use crate::domain::ports::{InvocationContext, InvocationOutcome};
use crate::domain::services::BeforeOutcome;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Operation table plus the invocation pipeline.
///
/// Bindings are immutable once registered, so concurrent dispatches share
/// them without locking.
pub struct Dispatcher {
    operations: DashMap<String, Arc<OperationBinding>>,
}

impl Dispatcher {
    /// Create a dispatcher with no registered operations.
    pub fn new() -> Self {
        Self {
            operations: DashMap::new(),
        }
    }

    /// Register a validated binding under its operation id.
    pub fn register(&self, binding: OperationBinding) -> Result<Arc<OperationBinding>, BindingError> {
        match self.operations.entry(binding.operation_id().to_string()) {
            Entry::Occupied(entry) => Err(BindingError::DuplicateOperation(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::info!(
                    "registered operation {} -> {}::{} ({} extensions)",
                    binding.operation_id(),
                    binding.handler_type(),
                    binding.method().name,
                    binding.extensions().len()
                );
                let binding = Arc::new(binding);
                entry.insert(binding.clone());
                Ok(binding)
            }
        }
    }

    /// Look up the binding for an operation id.
    pub fn find(&self, operation_id: &str) -> Option<Arc<OperationBinding>> {
        self.operations.get(operation_id).map(|e| e.value().clone())
    }

    /// Registered operation ids, sorted.
    pub fn operation_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.operations.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Invoke an operation by id.
    ///
    /// # Returns
    /// The mapped response, or a [`Fault`] describing which stage failed.
    pub async fn dispatch(&self, operation_id: &str, raw: Value) -> Result<Value, Fault> {
        let Some(binding) = self.find(operation_id) else {
            let fault = Fault::unknown_operation(operation_id);
            tracing::warn!("{}", fault);
            return Err(fault);
        };

        Self::dispatch_binding(&binding, raw).await
    }

    /// Invoke an already looked-up binding.
    pub async fn dispatch_binding(binding: &OperationBinding, raw: Value) -> Result<Value, Fault> {
        let invocation_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "invoke",
            operation = %binding.operation_id(),
            invocation = %invocation_id
        );

        let result = Self::invoke(binding, invocation_id, raw).instrument(span).await;
        if let Err(fault) = &result {
            tracing::warn!("{} (invocation {})", fault, invocation_id);
        }
        result
    }

    async fn invoke(
        binding: &OperationBinding,
        invocation_id: Uuid,
        raw: Value,
    ) -> Result<Value, Fault> {
        let operation_id = binding.operation_id();
        let fault = |kind, error| Fault::from_error(kind, operation_id, invocation_id, error);

        let arguments = binding
            .arguments_mapper()
            .map_arguments(&raw, binding)
            .map_err(|e| fault(FaultKind::ArgumentMapping, e))?;

        let ctx = InvocationContext {
            invocation_id,
            operation_id: operation_id.to_string(),
            arguments,
        };

        let (scope, before) = binding.extensions().enter(&ctx);
        let result = match before {
            BeforeOutcome::Proceed => {
                let method = binding.method().name.as_str();
                tracing::debug!("invoking {}::{}", binding.handler_type(), method);

                AssertUnwindSafe(binding.handler().invoke(method, &ctx.arguments))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        Err(InvocationError::internal(format!("handler {} panicked", method)))
                    })
            }
            BeforeOutcome::ShortCircuit { response, .. } => {
                scope.finish(&InvocationOutcome::ShortCircuited(&response));
                return Ok(response);
            }
            BeforeOutcome::Failed { extension, error } => {
                scope.finish(&InvocationOutcome::Failed(&error));
                let error = InvocationError::new(
                    error.status,
                    format!("{}: {}", extension, error.message),
                );
                return Err(fault(FaultKind::Extension, error));
            }
        };

        match &result {
            Ok(value) => scope.finish(&InvocationOutcome::Completed(value)),
            Err(error) => scope.finish(&InvocationOutcome::Failed(error)),
        }

        let value = result.map_err(|e| fault(FaultKind::Handler, e))?;
        binding
            .response_mapper()
            .map_response(value)
            .map_err(|e| fault(FaultKind::ResponseMapping, e))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
