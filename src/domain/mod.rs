pub mod analytics;
pub mod calendar;
pub mod events;
pub mod profile;
pub mod property;
pub mod repositories;
pub mod tour_request;

// Re-export commonly used types
pub use calendar::CalendarEvent;
pub use profile::Profile;
pub use property::Property;
pub use repositories::{DomainResult, RepositoryProvider};
pub use tour_request::{TimeSlot, TourRequest, TourRequestDetails, TourRequestStatus};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
