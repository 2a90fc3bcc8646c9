//! Order lifecycle events.
//!
//! Other components can subscribe to these to react when a payment is confirmed, without having any access to the
//! engine's internal state.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
