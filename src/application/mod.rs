//! Application layer - use cases on top of the domain

pub mod events;
pub mod services;

pub use events::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use services::{
    start_tour_expiry_task, AnalyticsService, CalendarService, NewTourRequest, TourRequestService,
};
