//! contract-invoke Library
//!
//! Binds contract-declared operations to in-process handler methods and
//! instruments each invocation's lifecycle with concurrency-safe metrics.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::{json_binding, JsonArgumentsMapper, JsonResponseMapper};
pub use adapters::outbound::{DashMapMetricsRegistry, PrometheusExporter};
pub use application::{Dispatcher, MetricsEventBus};
pub use config::load_config;
pub use domain::binding::OperationBinding;
pub use domain::errors::{BindingError, Fault, FaultKind, InvocationError, MetricsError};
pub use domain::ports::{
    ArgumentsMapper, InvokeExtension, MetricsEventListener, MetricsRegistry, OperationHandler,
    ResponseMapper,
};
pub use domain::services::{InvokeExtensionChain, ParameterTypeResolver};
