pub mod analytics;
pub mod calendar;
pub mod health;
pub mod metrics;
pub mod realtor;
pub mod request_id;
pub mod tour_requests;
