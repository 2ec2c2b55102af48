//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod profile_repository;
pub mod property_repository;
pub mod repository_provider;
pub mod tour_request_repository;

pub use repository_provider::SeaOrmRepositoryProvider;
