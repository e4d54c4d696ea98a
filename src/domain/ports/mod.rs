mod arguments_mapper;
mod invoke_extension;
mod metrics_event_listener;
mod metrics_registry;
mod operation_handler;
mod response_mapper;

pub use arguments_mapper::ArgumentsMapper;
pub use invoke_extension::{
    BeforeInvoke, InvocationContext, InvocationOutcome, InvokeExtension,
};
pub use metrics_event_listener::MetricsEventListener;
pub use metrics_registry::MetricsRegistry;
pub use operation_handler::OperationHandler;
pub use response_mapper::ResponseMapper;
