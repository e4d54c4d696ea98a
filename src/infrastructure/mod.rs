//! Infrastructure Layer
//!
//! Cross-cutting invoke extensions.

pub mod rate_limit_extension;
pub mod tracing_extension;

pub use rate_limit_extension::{RateLimitConfig, RateLimitExtension};
pub use tracing_extension::TracingExtension;
