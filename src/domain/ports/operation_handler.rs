//! Operation Handler Port
//!
//! Defines the interface through which bound handler methods are invoked.

use crate::domain::errors::InvocationError;
use async_trait::async_trait;
use serde_json::Value;

/// A handler instance exposing one or more methods.
///
/// The instance is shared and externally owned; bindings only hold a
/// reference to it. Its runtime type may differ from the declared handler
/// type a binding records (proxies, interceptors), so dispatch goes through
/// this interface rather than through the concrete type.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Invoke `method` with arguments already mapped to handler order.
    async fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvocationError>;
}
