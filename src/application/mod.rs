//! Application layer - Use cases
//!
//! Operation dispatch and metrics event routing.

mod dispatcher;
mod event_bus;
pub mod listeners;

pub use dispatcher::Dispatcher;
pub use event_bus::MetricsEventBus;
pub use listeners::{
    InvocationFinishedListener, MetricResolver, QueueArrivalListener, QueueDepartureListener,
};
