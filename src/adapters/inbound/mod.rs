mod json_arguments_mapper;
mod json_response_mapper;

pub use json_arguments_mapper::JsonArgumentsMapper;
pub use json_response_mapper::JsonResponseMapper;

use crate::domain::binding::{OperationBinding, OperationBindingBuilder};
use crate::domain::entities::{ContractOperation, HandlerMethod};
use crate::domain::ports::OperationHandler;
use std::sync::Arc;

/// Binding builder preconfigured with the JSON mappers.
///
/// The response mapper checks results against the operation's declared
/// response type.
pub fn json_binding(
    operation: ContractOperation,
    handler: Arc<dyn OperationHandler>,
    method: HandlerMethod,
) -> OperationBindingBuilder {
    let response_type = operation.response_type.clone();
    OperationBinding::builder(operation, handler, method)
        .arguments_mapper(Arc::new(JsonArgumentsMapper::new()))
        .response_mapper(Arc::new(JsonResponseMapper::checked(response_type)))
}
