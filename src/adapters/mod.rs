//! Adapters
//!
//! Inbound adapters shape wire arguments and responses for the dispatcher.
//! Outbound adapters store and export metrics.

pub mod inbound;
pub mod outbound;
