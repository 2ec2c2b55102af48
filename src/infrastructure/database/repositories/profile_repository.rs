//! SeaORM implementation of ProfileRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::debug;

use crate::domain::profile::{Profile, ProfileRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::profile;

pub struct SeaOrmProfileRepository {
    db: DatabaseConnection,
}

impl SeaOrmProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: profile::Model) -> Profile {
    Profile {
        id: m.id,
        full_name: m.full_name,
        email: m.email,
        is_agent: m.is_agent,
        created_at: m.created_at,
    }
}

#[async_trait]
impl ProfileRepository for SeaOrmProfileRepository {
    async fn save(&self, p: Profile) -> DomainResult<()> {
        debug!(profile_id = %p.id, is_agent = p.is_agent, "Saving profile");

        let model = profile::ActiveModel {
            id: Set(p.id),
            full_name: Set(p.full_name),
            email: Set(p.email),
            is_agent: Set(p.is_agent),
            created_at: Set(p.created_at),
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Profile>> {
        let model = profile::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = profile::Entity::find()
            .filter(profile::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
