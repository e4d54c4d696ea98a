//! Domain Layer
//!
//! Contract declarations, bindings, metrics values and the ports the
//! application layer drives. No transport or storage concerns.

pub mod binding;
pub mod entities;
pub mod errors;
pub mod events;
pub mod metric;
pub mod ports;
pub mod services;
pub mod value_objects;
