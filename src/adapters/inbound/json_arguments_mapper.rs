//! JSON Arguments Mapper
//!
//! Maps a JSON object keyed by contract parameter name onto handler
//! arguments, destructuring wrapped body parameters field by field.

use crate::domain::binding::OperationBinding;
use crate::domain::errors::InvocationError;
use crate::domain::ports::ArgumentsMapper;
use crate::domain::services::ParameterTypeResolver;
use crate::domain::value_objects::TypeRef;
use serde_json::{Map, Value};

/// Default arguments mapper for JSON-shaped wire arguments.
///
/// Raw arguments must be an object (or null when the operation takes no
/// parameters). A contract parameter that resolves to [`TypeRef::Opaque`]
/// while being a wrapped body contributes its fields as candidates for the
/// handler parameters; every other parameter is passed through whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArgumentsMapper;

impl JsonArgumentsMapper {
    pub fn new() -> Self {
        Self
    }

    fn collect_candidates(
        raw: &Map<String, Value>,
        binding: &OperationBinding,
    ) -> Result<Map<String, Value>, InvocationError> {
        let mut candidates = Map::new();

        for parameter in &binding.operation().parameters {
            let value = raw.get(&parameter.name).cloned().unwrap_or(Value::Null);
            let ty = binding.resolve_parameter_type(&parameter.name)?;

            if *ty == TypeRef::Opaque && binding.is_wrapped_body_parameter(&parameter.name)? {
                match value {
                    Value::Object(fields) => {
                        for (field, v) in fields {
                            candidates.entry(field).or_insert(v);
                        }
                    }
                    Value::Null => {}
                    other => {
                        return Err(InvocationError::bad_request(format!(
                            "body parameter {} must be an object, got {}",
                            parameter.name, other
                        )))
                    }
                }
            } else {
                candidates.insert(parameter.name.clone(), value);
            }
        }

        Ok(candidates)
    }
}

impl ArgumentsMapper for JsonArgumentsMapper {
    fn map_arguments(
        &self,
        raw: &Value,
        binding: &OperationBinding,
    ) -> Result<Vec<Value>, InvocationError> {
        let empty = Map::new();
        let raw = match raw {
            Value::Object(fields) => fields,
            Value::Null => &empty,
            other => {
                return Err(InvocationError::bad_request(format!(
                    "arguments of {} must be an object, got {}",
                    binding.operation_id(),
                    other
                )))
            }
        };

        let mut candidates = Self::collect_candidates(raw, binding)?;
        let mut args = Vec::with_capacity(binding.method().parameters.len());

        for parameter in &binding.method().parameters {
            let name = ParameterTypeResolver::contract_name(parameter);
            let value = candidates.remove(name).unwrap_or(Value::Null);

            if value.is_null() && !parameter.ty.is_optional() {
                return Err(InvocationError::bad_request(format!(
                    "missing required parameter {}",
                    name
                )));
            }
            if !parameter.ty.accepts(&value) {
                return Err(InvocationError::bad_request(format!(
                    "parameter {} expects {}, got {}",
                    name, parameter.ty, value
                )));
            }

            args.push(value);
        }

        Ok(args)
    }
}
