//! Database entities module

pub mod profile;
pub mod property;
pub mod tour_request;

pub use profile::Entity as Profile;
pub use property::Entity as Property;
pub use tour_request::Entity as TourRequest;
