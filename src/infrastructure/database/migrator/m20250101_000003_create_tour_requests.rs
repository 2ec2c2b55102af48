//! Create tour_requests table
//!
//! Indexed for the agent dashboard queries (agent + status) and for the
//! expiry sweep (status + expires_at).

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_profiles::Profiles;
use super::m20250101_000002_create_properties::Properties;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TourRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TourRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TourRequests::UserId).string().not_null())
                    .col(ColumnDef::new(TourRequests::PropertyId).string().not_null())
                    .col(ColumnDef::new(TourRequests::AgentId).string().not_null())
                    .col(ColumnDef::new(TourRequests::RequestedDate).date())
                    .col(ColumnDef::new(TourRequests::RequestedTimeSlot).string())
                    .col(ColumnDef::new(TourRequests::Message).text())
                    .col(
                        ColumnDef::new(TourRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TourRequests::AgentResponseMessage).text())
                    .col(ColumnDef::new(TourRequests::RespondedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(TourRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TourRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TourRequests::ExpiresAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_requests_property")
                            .from(TourRequests::Table, TourRequests::PropertyId)
                            .to(Properties::Table, Properties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_requests_user")
                            .from(TourRequests::Table, TourRequests::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tour_requests_agent_status")
                    .table(TourRequests::Table)
                    .col(TourRequests::AgentId)
                    .col(TourRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tour_requests_expiry")
                    .table(TourRequests::Table)
                    .col(TourRequests::Status)
                    .col(TourRequests::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TourRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum TourRequests {
    Table,
    Id,
    UserId,
    PropertyId,
    AgentId,
    RequestedDate,
    RequestedTimeSlot,
    Message,
    Status,
    AgentResponseMessage,
    RespondedAt,
    CreatedAt,
    UpdatedAt,
    ExpiresAt,
}
