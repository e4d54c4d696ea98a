mod extension_chain;
mod parameter_resolver;

pub use extension_chain::{BeforeOutcome, InvocationScope, InvokeExtensionChain};
pub use parameter_resolver::ParameterTypeResolver;
