//! Property reference data

pub mod model;
pub mod repository;

pub use model::Property;
pub use repository::PropertyRepository;
