//! Domain events module.
//!
//! Core services emit a [`DomainEvent`] through a [`DomainEventSink`] after
//! each successful mutation. The server forwards them to connected clients.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
