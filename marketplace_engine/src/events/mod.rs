//! Marketplace events.
//!
//! Components that want to react to what the engine does (send a confirmation email, notify a seller, write an
//! audit trail) register a hook in [`EventHooks`]. The engine APIs publish through [`EventProducers`] and never wait on
//! the handlers.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
