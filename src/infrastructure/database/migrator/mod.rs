//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_profiles;
mod m20250101_000002_create_properties;
mod m20250101_000003_create_tour_requests;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_profiles::Migration),
            Box::new(m20250101_000002_create_properties::Migration),
            Box::new(m20250101_000003_create_tour_requests::Migration),
        ]
    }
}
