//! Domain events
//!
//! Facts about tour requests that are fanned out to open dashboards.
//! The EventBus implementation lives in `application::events`.

pub mod types;

pub use types::{Event, EventMessage, TourRequestCreatedEvent, TourRequestStatusChangedEvent};
