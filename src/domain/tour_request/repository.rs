//! Tour request repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{TourRequest, TourRequestStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait TourRequestRepository: Send + Sync {
    /// Save a new tour request
    async fn save(&self, request: TourRequest) -> DomainResult<()>;

    /// Find tour request by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<TourRequest>>;

    /// All requests addressed to an agent, newest first
    async fn find_for_agent(&self, agent_id: &str) -> DomainResult<Vec<TourRequest>>;

    /// Requests addressed to an agent with one of the given statuses,
    /// ordered by requested date (undated last)
    async fn find_for_agent_with_status(
        &self,
        agent_id: &str,
        statuses: &[TourRequestStatus],
    ) -> DomainResult<Vec<TourRequest>>;

    /// Requests for an agent created at or after `since`, oldest first
    async fn find_for_agent_since(
        &self,
        agent_id: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<TourRequest>>;

    /// Number of requests for an agent in the given status
    async fn count_for_agent_with_status(
        &self,
        agent_id: &str,
        status: TourRequestStatus,
    ) -> DomainResult<u64>;

    /// Pending requests whose `expires_at` is before `now`
    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<TourRequest>>;

    /// Persist a transition only if the stored status still equals `expected`.
    ///
    /// Returns `false` when the row was changed concurrently.
    async fn update_if_status(
        &self,
        request: &TourRequest,
        expected: TourRequestStatus,
    ) -> DomainResult<bool>;
}
