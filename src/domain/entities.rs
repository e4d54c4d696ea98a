//! Domain Entities - Core business objects
//!
//! Declarations produced by the contract parser and by handler registration.
//! They carry no behavior beyond lookups.

use crate::domain::value_objects::{ParameterKind, TypeRef};
use serde::{Deserialize, Serialize};

/// One parameter declared by a contract operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractParameter {
    /// Wire-level parameter name
    pub name: String,
    /// Where the parameter lives on the wire
    pub kind: ParameterKind,
    /// Wire-declared type
    pub wire_type: TypeRef,
}

impl ContractParameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind, wire_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind,
            wire_type,
        }
    }

    pub fn body(name: impl Into<String>, wire_type: TypeRef) -> Self {
        Self::new(name, ParameterKind::Body, wire_type)
    }

    pub fn query(name: impl Into<String>, wire_type: TypeRef) -> Self {
        Self::new(name, ParameterKind::Query, wire_type)
    }

    pub fn path(name: impl Into<String>, wire_type: TypeRef) -> Self {
        Self::new(name, ParameterKind::Path, wire_type)
    }

    pub fn is_body(&self) -> bool {
        self.kind == ParameterKind::Body
    }
}

/// A remotely invocable operation as declared by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractOperation {
    /// Unique key of the operation
    pub operation_id: String,
    /// Declared parameters, in contract order
    pub parameters: Vec<ContractParameter>,
    /// Declared response shape
    pub response_type: TypeRef,
}

impl ContractOperation {
    pub fn new(operation_id: impl Into<String>, response_type: TypeRef) -> Self {
        Self {
            operation_id: operation_id.into(),
            parameters: Vec::new(),
            response_type,
        }
    }

    /// Add a parameter (builder style).
    pub fn parameter(mut self, parameter: ContractParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Find a declared parameter by wire name.
    pub fn find_parameter(&self, name: &str) -> Option<&ContractParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// One parameter of a handler method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerParameter {
    /// Host-side parameter name
    pub name: String,
    /// Explicit wire name, if the handler renames the parameter
    pub alias: Option<String>,
    /// Host-side type
    pub ty: TypeRef,
}

impl HandlerParameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            alias: None,
            ty,
        }
    }

    /// Expose this parameter under a different wire name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// A handler method a contract operation is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerMethod {
    /// Method name passed to the handler on invocation
    pub name: String,
    /// Parameters in call order
    pub parameters: Vec<HandlerParameter>,
    /// Type the method returns
    pub return_type: TypeRef,
}

impl HandlerMethod {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type,
        }
    }

    /// Add a parameter (builder style).
    pub fn parameter(mut self, parameter: HandlerParameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_operation_builder() {
        let op = ContractOperation::new("addUser", TypeRef::Named("User".to_string()))
            .parameter(ContractParameter::body("user", TypeRef::Named("User".to_string())))
            .parameter(ContractParameter::query("dryRun", TypeRef::Bool));

        assert_eq!(op.operation_id, "addUser");
        assert_eq!(op.parameters.len(), 2);
        assert!(op.find_parameter("user").unwrap().is_body());
        assert!(!op.find_parameter("dryRun").unwrap().is_body());
        assert!(op.find_parameter("missing").is_none());
    }

    #[test]
    fn test_handler_parameter_alias() {
        let p = HandlerParameter::new("dry_run", TypeRef::Bool).alias("dryRun");
        assert_eq!(p.name, "dry_run");
        assert_eq!(p.alias.as_deref(), Some("dryRun"));
    }

    #[test]
    fn test_handler_method_builder() {
        let m = HandlerMethod::new("add", TypeRef::Integer)
            .parameter(HandlerParameter::new("x", TypeRef::Integer))
            .parameter(HandlerParameter::new("y", TypeRef::Integer));

        assert_eq!(m.name, "add");
        assert_eq!(m.parameters.len(), 2);
        assert_eq!(m.parameters[1].name, "y");
    }

    #[test]
    fn test_contract_operation_serde() {
        let op = ContractOperation::new("ping", TypeRef::String)
            .parameter(ContractParameter::path("id", TypeRef::Integer));
        let json = serde_json::to_string(&op).unwrap();
        let back: ContractOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }
}
