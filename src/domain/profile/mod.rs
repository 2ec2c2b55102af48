//! Profile reference data (requesters and agents)

pub mod model;
pub mod repository;

pub use model::Profile;
pub use repository::ProfileRepository;
