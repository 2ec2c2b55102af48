//! Tour request aggregate
//!
//! Contains the TourRequest entity, its status state machine and the
//! repository interface.

pub mod model;
pub mod repository;

pub use model::{TimeSlot, TourRequest, TourRequestDetails, TourRequestStatus, TransitionError};
pub use repository::TourRequestRepository;
