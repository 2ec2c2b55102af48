//! Profile repository interface

use async_trait::async_trait;

use super::model::Profile;
use crate::domain::DomainResult;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn save(&self, profile: Profile) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Profile>>;

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<Profile>>;
}
