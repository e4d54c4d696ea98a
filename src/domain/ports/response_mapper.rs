//! Response Mapper Port
//!
//! Converts handler results into wire-shaped responses.

use crate::domain::errors::InvocationError;
use serde_json::Value;

/// Converts a handler result into a raw response.
pub trait ResponseMapper: Send + Sync {
    fn map_response(&self, result: Value) -> Result<Value, InvocationError>;
}
