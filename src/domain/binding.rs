//! Operation Binding
//!
//! One resolved pairing of a contract operation with the handler method that
//! implements it. Built and validated once at registration; shared read-only
//! by every concurrent dispatch afterwards.

use crate::domain::entities::{ContractOperation, HandlerMethod};
use crate::domain::errors::BindingError;
use crate::domain::ports::{ArgumentsMapper, InvokeExtension, OperationHandler, ResponseMapper};
use crate::domain::services::{InvokeExtensionChain, ParameterTypeResolver};
use crate::domain::value_objects::TypeRef;
use std::collections::HashMap;
use std::sync::Arc;

static OPAQUE: TypeRef = TypeRef::Opaque;

/// Contract operation bound to a handler method.
pub struct OperationBinding {
    operation: ContractOperation,
    /// Declared handler type; may differ from the instance's runtime type
    handler_type: String,
    handler: Arc<dyn OperationHandler>,
    method: HandlerMethod,
    /// Wire-declared types keyed by contract parameter name
    contract_parameter_types: HashMap<String, TypeRef>,
    /// Handler parameter types keyed by contract-visible name.
    /// Rebuilt together with `method`, never separately.
    handler_parameter_types: HashMap<String, TypeRef>,
    arguments_mapper: Arc<dyn ArgumentsMapper>,
    response_mapper: Arc<dyn ResponseMapper>,
    extensions: InvokeExtensionChain,
}

impl OperationBinding {
    /// Start building a binding.
    pub fn builder(
        operation: ContractOperation,
        handler: Arc<dyn OperationHandler>,
        method: HandlerMethod,
    ) -> OperationBindingBuilder {
        OperationBindingBuilder {
            operation,
            handler_type: None,
            handler,
            method,
            arguments_mapper: None,
            response_mapper: None,
            extensions: InvokeExtensionChain::new(),
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation.operation_id
    }

    pub fn operation(&self) -> &ContractOperation {
        &self.operation
    }

    pub fn handler_type(&self) -> &str {
        &self.handler_type
    }

    pub fn handler(&self) -> &Arc<dyn OperationHandler> {
        &self.handler
    }

    pub fn method(&self) -> &HandlerMethod {
        &self.method
    }

    pub fn contract_parameter_types(&self) -> &HashMap<String, TypeRef> {
        &self.contract_parameter_types
    }

    pub fn handler_parameter_types(&self) -> &HashMap<String, TypeRef> {
        &self.handler_parameter_types
    }

    pub fn arguments_mapper(&self) -> &Arc<dyn ArgumentsMapper> {
        &self.arguments_mapper
    }

    pub fn response_mapper(&self) -> &Arc<dyn ResponseMapper> {
        &self.response_mapper
    }

    pub fn extensions(&self) -> &InvokeExtensionChain {
        &self.extensions
    }

    /// Bind a (new) handler method.
    ///
    /// Replaces the parameter mapping wholesale. On error neither the method
    /// nor the mapping changes.
    pub fn bind_method(&mut self, method: HandlerMethod) -> Result<(), BindingError> {
        let types = ParameterTypeResolver::resolve(self.operation_id(), &method)?;
        Self::validate(&self.operation, &method, &types)?;

        self.method = method;
        self.handler_parameter_types = types;
        Ok(())
    }

    /// Whether a body parameter is destructured into several handler
    /// parameters instead of being passed as one object.
    pub fn is_wrapped_body_parameter(&self, name: &str) -> Result<bool, BindingError> {
        let parameter = self.operation.find_parameter(name).ok_or_else(|| {
            BindingError::UnknownParameter {
                operation_id: self.operation_id().to_string(),
                name: name.to_string(),
            }
        })?;

        Ok(parameter.is_body() && !self.handler_parameter_types.contains_key(name))
    }

    /// Type a contract parameter is decoded into.
    ///
    /// Direct handler mappings win. A body parameter without one resolves to
    /// [`TypeRef::Opaque`], meaning "decode field by field against the
    /// handler parameters".
    pub fn resolve_parameter_type(&self, name: &str) -> Result<&TypeRef, BindingError> {
        Self::resolve_in(&self.operation, &self.handler_parameter_types, name)
    }

    fn resolve_in<'a>(
        operation: &ContractOperation,
        handler_types: &'a HashMap<String, TypeRef>,
        name: &str,
    ) -> Result<&'a TypeRef, BindingError> {
        let parameter =
            operation
                .find_parameter(name)
                .ok_or_else(|| BindingError::UnknownParameter {
                    operation_id: operation.operation_id.clone(),
                    name: name.to_string(),
                })?;

        match handler_types.get(name) {
            Some(ty) => Ok(ty),
            None if parameter.is_body() => Ok(&OPAQUE),
            None => Err(BindingError::BindingMismatch {
                operation_id: operation.operation_id.clone(),
                parameter: name.to_string(),
            }),
        }
    }

    /// Check a method against the contract before it is accepted.
    fn validate(
        operation: &ContractOperation,
        method: &HandlerMethod,
        handler_types: &HashMap<String, TypeRef>,
    ) -> Result<(), BindingError> {
        for parameter in &operation.parameters {
            Self::resolve_in(operation, handler_types, &parameter.name)?;
        }

        let has_wrapped_body = operation
            .parameters
            .iter()
            .any(|p| p.is_body() && !handler_types.contains_key(&p.name));

        for parameter in &method.parameters {
            let name = ParameterTypeResolver::contract_name(parameter);
            if operation.find_parameter(name).is_none() && !has_wrapped_body {
                return Err(BindingError::UnmappedHandlerParameter {
                    operation_id: operation.operation_id.clone(),
                    parameter: name.to_string(),
                });
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for OperationBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationBinding")
            .field("operation_id", &self.operation.operation_id)
            .field("handler_type", &self.handler_type)
            .field("method", &self.method.name)
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// Builder for [`OperationBinding`].
pub struct OperationBindingBuilder {
    operation: ContractOperation,
    handler_type: Option<String>,
    handler: Arc<dyn OperationHandler>,
    method: HandlerMethod,
    arguments_mapper: Option<Arc<dyn ArgumentsMapper>>,
    response_mapper: Option<Arc<dyn ResponseMapper>>,
    extensions: InvokeExtensionChain,
}

impl OperationBindingBuilder {
    /// Declared handler type name. Defaults to the operation id.
    pub fn handler_type(mut self, handler_type: impl Into<String>) -> Self {
        self.handler_type = Some(handler_type.into());
        self
    }

    pub fn arguments_mapper(mut self, mapper: Arc<dyn ArgumentsMapper>) -> Self {
        self.arguments_mapper = Some(mapper);
        self
    }

    pub fn response_mapper(mut self, mapper: Arc<dyn ResponseMapper>) -> Self {
        self.response_mapper = Some(mapper);
        self
    }

    pub fn extension(mut self, extension: Arc<dyn InvokeExtension>) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn extensions(mut self, chain: InvokeExtensionChain) -> Self {
        self.extensions = chain;
        self
    }

    /// Resolve and validate the binding.
    pub fn build(self) -> Result<OperationBinding, BindingError> {
        let operation_id = self.operation.operation_id.clone();

        let arguments_mapper = self.arguments_mapper.ok_or(BindingError::MissingMapper {
            operation_id: operation_id.clone(),
            mapper: "arguments",
        })?;
        let response_mapper = self.response_mapper.ok_or(BindingError::MissingMapper {
            operation_id: operation_id.clone(),
            mapper: "response",
        })?;

        let handler_parameter_types = ParameterTypeResolver::resolve(&operation_id, &self.method)?;
        OperationBinding::validate(&self.operation, &self.method, &handler_parameter_types)?;

        let contract_parameter_types = self
            .operation
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.wire_type.clone()))
            .collect();

        Ok(OperationBinding {
            handler_type: self.handler_type.unwrap_or_else(|| operation_id.clone()),
            operation: self.operation,
            handler: self.handler,
            method: self.method,
            contract_parameter_types,
            handler_parameter_types,
            arguments_mapper,
            response_mapper,
            extensions: self.extensions,
        })
    }
}
