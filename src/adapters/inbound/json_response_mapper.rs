//! JSON Response Mapper
//!
//! Passes handler results through as the wire response, optionally
//! checking them against the declared response type first.

use crate::domain::errors::InvocationError;
use crate::domain::ports::ResponseMapper;
use crate::domain::value_objects::TypeRef;
use serde_json::Value;

/// Default response mapper for JSON-shaped results.
#[derive(Debug, Clone, Default)]
pub struct JsonResponseMapper {
    /// Declared response type; unchecked when absent
    response_type: Option<TypeRef>,
}

impl JsonResponseMapper {
    /// Mapper that accepts any result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper that rejects results not matching `response_type`.
    pub fn checked(response_type: TypeRef) -> Self {
        Self {
            response_type: Some(response_type),
        }
    }
}

impl ResponseMapper for JsonResponseMapper {
    fn map_response(&self, result: Value) -> Result<Value, InvocationError> {
        match &self.response_type {
            Some(ty) if !ty.accepts(&result) => Err(InvocationError::internal(format!(
                "handler returned {} where {} was declared",
                result, ty
            ))),
            _ => Ok(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unchecked_passes_through() {
        let mapper = JsonResponseMapper::new();
        assert_eq!(mapper.map_response(json!({"a": 1})).unwrap(), json!({"a": 1}));
        assert_eq!(mapper.map_response(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_checked_accepts_matching_result() {
        let mapper = JsonResponseMapper::checked(TypeRef::Integer);
        assert_eq!(mapper.map_response(json!(42)).unwrap(), json!(42));
    }

    #[test]
    fn test_checked_rejects_mismatch() {
        let mapper = JsonResponseMapper::checked(TypeRef::Integer);
        let err = mapper.map_response(json!("42")).unwrap_err();
        assert_eq!(err.status, 500);
        assert!(err.message.contains("integer"));
    }
}
