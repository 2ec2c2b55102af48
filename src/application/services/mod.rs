//! Application services

mod analytics;
mod calendar;
mod tour_expiry;
mod tour_request;

pub use analytics::{AnalyticsService, MAX_TREND_DAYS};
pub use calendar::CalendarService;
pub use tour_expiry::start_tour_expiry_task;
pub use tour_request::{NewTourRequest, TourRequestService};
