//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::profile::ProfileRepository;
use crate::domain::property::PropertyRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::tour_request::TourRequestRepository;

use super::profile_repository::SeaOrmProfileRepository;
use super::property_repository::SeaOrmPropertyRepository;
use super::tour_request_repository::SeaOrmTourRequestRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let pending = repos.tour_requests().count_for_agent_with_status("agent-1", TourRequestStatus::Pending).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    tour_requests: SeaOrmTourRequestRepository,
    properties: SeaOrmPropertyRepository,
    profiles: SeaOrmProfileRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            tour_requests: SeaOrmTourRequestRepository::new(db.clone()),
            properties: SeaOrmPropertyRepository::new(db.clone()),
            profiles: SeaOrmProfileRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn tour_requests(&self) -> &dyn TourRequestRepository {
        &self.tour_requests
    }

    fn properties(&self) -> &dyn PropertyRepository {
        &self.properties
    }

    fn profiles(&self) -> &dyn ProfileRepository {
        &self.profiles
    }
}
