//! Tour request entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tour_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,
    pub property_id: String,
    pub agent_id: String,

    #[sea_orm(nullable)]
    pub requested_date: Option<Date>,

    /// morning, afternoon, evening
    #[sea_orm(nullable)]
    pub requested_time_slot: Option<String>,

    #[sea_orm(nullable)]
    pub message: Option<String>,

    /// pending, approved, denied, cancelled, expired, completed
    pub status: String,

    #[sea_orm(nullable)]
    pub agent_response_message: Option<String>,

    #[sea_orm(nullable)]
    pub responded_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id"
    )]
    Property,
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Requester,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
