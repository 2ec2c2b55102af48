//! Event fan-out
//!
//! Event types live in `domain::events`; this module owns the broadcast bus.

mod event_bus;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
