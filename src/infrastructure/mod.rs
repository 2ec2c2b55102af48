//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod realtor;
pub mod storage;

pub use database::{init_database, DatabaseConfig};
pub use realtor::{RealtorClient, RealtorConfig};
pub use storage::InMemoryRepositoryProvider;
