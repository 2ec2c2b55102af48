//! SeaORM implementation of PropertyRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::property::{Property, PropertyRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::property;

pub struct SeaOrmPropertyRepository {
    db: DatabaseConnection,
}

impl SeaOrmPropertyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: property::Model) -> Property {
    Property {
        id: m.id,
        address: m.address,
        city: m.city,
        state: m.state,
        zip_code: m.zip_code,
        listing_agent_id: m.listing_agent_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl PropertyRepository for SeaOrmPropertyRepository {
    async fn save(&self, p: Property) -> DomainResult<()> {
        debug!(property_id = %p.id, "Saving property");

        let model = property::ActiveModel {
            id: Set(p.id),
            address: Set(p.address),
            city: Set(p.city),
            state: Set(p.state),
            zip_code: Set(p.zip_code),
            listing_agent_id: Set(p.listing_agent_id),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Property>> {
        let model = property::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<Property>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = property::Entity::find()
            .filter(property::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_agent(&self, agent_id: &str) -> DomainResult<Vec<Property>> {
        let models = property::Entity::find()
            .filter(property::Column::ListingAgentId.eq(agent_id))
            .order_by_asc(property::Column::Address)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
