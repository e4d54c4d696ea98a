//! Arguments Mapper Port
//!
//! Converts wire-shaped arguments into handler call arguments.

use crate::domain::binding::OperationBinding;
use crate::domain::errors::InvocationError;
use serde_json::Value;

/// Produces handler-call arguments from raw wire arguments.
///
/// Implementations consult [`OperationBinding::resolve_parameter_type`] for
/// parameters that need structural decoding.
pub trait ArgumentsMapper: Send + Sync {
    /// Map raw arguments into handler parameter order.
    fn map_arguments(
        &self,
        raw: &Value,
        binding: &OperationBinding,
    ) -> Result<Vec<Value>, InvocationError>;
}
