//! Parameter Type Resolver
//!
//! Derives, once per bind, which contract-visible name each handler
//! parameter answers to. The naming rule is the one the contract generator
//! applies, so both sides line up without per-call introspection.

use crate::domain::entities::{HandlerMethod, HandlerParameter};
use crate::domain::errors::BindingError;
use crate::domain::value_objects::TypeRef;
use std::collections::HashMap;

/// Stateless resolver from handler parameters to contract names.
pub struct ParameterTypeResolver;

impl ParameterTypeResolver {
    /// Contract-visible name of a handler parameter.
    ///
    /// An explicit alias wins; otherwise the host-side name is used.
    pub fn contract_name(parameter: &HandlerParameter) -> &str {
        parameter.alias.as_deref().unwrap_or(&parameter.name)
    }

    /// Build the `contract name -> handler type` mapping for a method.
    ///
    /// Produces exactly one entry per handler parameter. Two parameters
    /// answering to the same contract name are rejected.
    pub fn resolve(
        operation_id: &str,
        method: &HandlerMethod,
    ) -> Result<HashMap<String, TypeRef>, BindingError> {
        let mut types = HashMap::with_capacity(method.parameters.len());

        for parameter in &method.parameters {
            let name = Self::contract_name(parameter);
            if types.insert(name.to_string(), parameter.ty.clone()).is_some() {
                return Err(BindingError::DuplicateHandlerParameter {
                    operation_id: operation_id.to_string(),
                    parameter: name.to_string(),
                });
            }
        }

        Ok(types)
    }
}
