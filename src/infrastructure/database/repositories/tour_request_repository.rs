//! SeaORM implementation of TourRequestRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, warn};

use crate::domain::tour_request::{TourRequest, TourRequestRepository, TourRequestStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::tour_request;

pub struct SeaOrmTourRequestRepository {
    db: DatabaseConnection,
}

impl SeaOrmTourRequestRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

/// Rows whose status is not one of the canonical names are rejected, so the
/// Rust side never disagrees with the exact-match status filters in SQL.
fn model_to_domain(m: tour_request::Model) -> DomainResult<TourRequest> {
    let status = TourRequestStatus::parse(&m.status).ok_or_else(|| {
        DomainError::Storage(format!(
            "Tour request {} has unrecognized status '{}'",
            m.id, m.status
        ))
    })?;

    Ok(TourRequest {
        id: m.id,
        user_id: m.user_id,
        property_id: m.property_id,
        agent_id: m.agent_id,
        requested_date: m.requested_date,
        requested_time_slot: m.requested_time_slot,
        message: m.message,
        status,
        agent_response_message: m.agent_response_message,
        responded_at: m.responded_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
        expires_at: m.expires_at,
    })
}

/// Converts a result set, skipping rows with an unrecognized status.
fn known_rows(models: Vec<tour_request::Model>) -> Vec<TourRequest> {
    models
        .into_iter()
        .filter_map(|m| match model_to_domain(m) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!(error = %e, "Skipping tour request row");
                None
            }
        })
        .collect()
}

fn domain_to_active(r: &TourRequest) -> tour_request::ActiveModel {
    tour_request::ActiveModel {
        id: Set(r.id.clone()),
        user_id: Set(r.user_id.clone()),
        property_id: Set(r.property_id.clone()),
        agent_id: Set(r.agent_id.clone()),
        requested_date: Set(r.requested_date),
        requested_time_slot: Set(r.requested_time_slot.clone()),
        message: Set(r.message.clone()),
        status: Set(r.status.as_str().to_string()),
        agent_response_message: Set(r.agent_response_message.clone()),
        responded_at: Set(r.responded_at),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
        expires_at: Set(r.expires_at),
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::from(e)
}

/// Requested date ascending, undated requests last.
fn sort_by_requested_date(requests: &mut [TourRequest]) {
    requests.sort_by_key(|r| (r.requested_date.is_none(), r.requested_date));
}

// ── TourRequestRepository impl ──────────────────────────────────

#[async_trait]
impl TourRequestRepository for SeaOrmTourRequestRepository {
    async fn save(&self, r: TourRequest) -> DomainResult<()> {
        debug!(request_id = %r.id, agent_id = %r.agent_id, "Saving tour request");
        domain_to_active(&r).insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<TourRequest>> {
        let model = tour_request::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_for_agent(&self, agent_id: &str) -> DomainResult<Vec<TourRequest>> {
        let models = tour_request::Entity::find()
            .filter(tour_request::Column::AgentId.eq(agent_id))
            .order_by_desc(tour_request::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(known_rows(models))
    }

    async fn find_for_agent_with_status(
        &self,
        agent_id: &str,
        statuses: &[TourRequestStatus],
    ) -> DomainResult<Vec<TourRequest>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let models = tour_request::Entity::find()
            .filter(tour_request::Column::AgentId.eq(agent_id))
            .filter(tour_request::Column::Status.is_in(statuses.iter().map(|s| s.as_str())))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut requests = known_rows(models);
        sort_by_requested_date(&mut requests);
        Ok(requests)
    }

    async fn find_for_agent_since(
        &self,
        agent_id: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<TourRequest>> {
        let models = tour_request::Entity::find()
            .filter(tour_request::Column::AgentId.eq(agent_id))
            .filter(tour_request::Column::CreatedAt.gte(since))
            .order_by_asc(tour_request::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(known_rows(models))
    }

    async fn count_for_agent_with_status(
        &self,
        agent_id: &str,
        status: TourRequestStatus,
    ) -> DomainResult<u64> {
        tour_request::Entity::find()
            .filter(tour_request::Column::AgentId.eq(agent_id))
            .filter(tour_request::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<TourRequest>> {
        let models = tour_request::Entity::find()
            .filter(tour_request::Column::Status.eq(TourRequestStatus::Pending.as_str()))
            .filter(tour_request::Column::ExpiresAt.lt(now))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(known_rows(models))
    }

    async fn update_if_status(
        &self,
        r: &TourRequest,
        expected: TourRequestStatus,
    ) -> DomainResult<bool> {
        debug!(
            request_id = %r.id,
            expected = %expected,
            status = %r.status,
            "Updating tour request"
        );

        let result = tour_request::Entity::update_many()
            .set(domain_to_active(r))
            .filter(tour_request::Column::Id.eq(r.id.as_str()))
            .filter(tour_request::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected == 1)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::Profile;
    use crate::domain::property::Property;
    use crate::domain::RepositoryProvider;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use chrono::{Duration, NaiveDate};
    use sea_orm::sea_query::Expr;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn seeded() -> (SeaOrmRepositoryProvider, TourRequest) {
        let (_, repos, request) = seeded_with_db().await;
        (repos, request)
    }

    async fn seeded_with_db() -> (DatabaseConnection, SeaOrmRepositoryProvider, TourRequest) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let repos = SeaOrmRepositoryProvider::new(db.clone());

        repos
            .profiles()
            .save(Profile::new("agent-1", Some("Dana Agent".into()), true))
            .await
            .unwrap();
        repos
            .profiles()
            .save(Profile::new("user-1", Some("Sam Buyer".into()), false))
            .await
            .unwrap();
        let property = Property::new("12 Oak St", Some("agent-1".into()));
        let property_id = property.id.clone();
        repos.properties().save(property).await.unwrap();

        let request = TourRequest::new(
            "user-1",
            property_id,
            "agent-1",
            NaiveDate::from_ymd_opt(2024, 6, 1),
            None,
            None,
            Some(Utc::now() - Duration::hours(1)),
        );
        repos.tour_requests().save(request.clone()).await.unwrap();
        (db, repos, request)
    }

    /// Writes a status behind the repository's back, as another client of
    /// the shared store might.
    async fn force_status(db: &DatabaseConnection, id: &str, status: &str) {
        tour_request::Entity::update_many()
            .col_expr(tour_request::Column::Status, Expr::value(status))
            .filter(tour_request::Column::Id.eq(id))
            .exec(db)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn conditional_update_applies_once() {
        let (repos, request) = seeded().await;

        let mut approved = request.clone();
        approved.approve(Some("ok".into()), None, Utc::now()).unwrap();
        let applied = repos
            .tour_requests()
            .update_if_status(&approved, TourRequestStatus::Pending)
            .await
            .unwrap();
        assert!(applied);

        let mut denied = request.clone();
        denied.deny("late", Utc::now()).unwrap();
        let applied = repos
            .tour_requests()
            .update_if_status(&denied, TourRequestStatus::Pending)
            .await
            .unwrap();
        assert!(!applied);

        let stored = repos
            .tour_requests()
            .find_by_id(&request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, TourRequestStatus::Approved);
        assert_eq!(stored.agent_response_message.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn overdue_and_counts() {
        let (repos, request) = seeded().await;

        let overdue = repos.tour_requests().find_overdue(Utc::now()).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, request.id);

        let pending = repos
            .tour_requests()
            .count_for_agent_with_status("agent-1", TourRequestStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending, 1);
    }

    #[tokio::test]
    async fn non_canonical_status_rows_are_not_counted_as_pending() {
        let (db, repos, declined) = seeded_with_db().await;
        let capitalized = TourRequest::new(
            "user-1",
            declined.property_id.clone(),
            "agent-1",
            None,
            None,
            None,
            None,
        );
        repos.tour_requests().save(capitalized.clone()).await.unwrap();
        let canonical = TourRequest::new(
            "user-1",
            declined.property_id.clone(),
            "agent-1",
            None,
            None,
            None,
            None,
        );
        repos.tour_requests().save(canonical.clone()).await.unwrap();

        force_status(&db, &declined.id, "declined").await;
        force_status(&db, &capitalized.id, "Pending").await;

        let listed = repos.tour_requests().find_for_agent("agent-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, canonical.id);

        let stats = crate::domain::analytics::count_by_status(&listed);
        let pending = repos
            .tour_requests()
            .count_for_agent_with_status("agent-1", TourRequestStatus::Pending)
            .await
            .unwrap();
        assert_eq!(stats.pending, pending);
        assert_eq!(pending, 1);

        let err = repos
            .tour_requests()
            .find_by_id(&capitalized.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
