//! Property repository interface

use async_trait::async_trait;

use super::model::Property;
use crate::domain::DomainResult;

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn save(&self, property: Property) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Property>>;

    /// Bulk lookup used to join tour requests with their properties
    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<Property>>;

    /// Listings owned by an agent
    async fn find_by_agent(&self, agent_id: &str) -> DomainResult<Vec<Property>>;
}
