//! In-memory repository provider
//!
//! Used by tests and by `database.url = "memory"`. Same semantics as the
//! SeaORM repositories, including the conditional status update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::profile::{Profile, ProfileRepository};
use crate::domain::property::{Property, PropertyRepository};
use crate::domain::repositories::RepositoryProvider;
use crate::domain::tour_request::{TourRequest, TourRequestRepository, TourRequestStatus};
use crate::domain::{DomainError, DomainResult};

/// In-memory storage for development and testing
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    tour_requests: InMemoryTourRequests,
    properties: InMemoryProperties,
    profiles: InMemoryProfiles,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
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

// ── Tour requests ───────────────────────────────────────────────

#[derive(Default)]
struct InMemoryTourRequests {
    rows: DashMap<String, TourRequest>,
}

impl InMemoryTourRequests {
    fn collect(&self, keep: impl Fn(&TourRequest) -> bool) -> Vec<TourRequest> {
        self.rows
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| e.value().clone())
            .collect()
    }
}

#[async_trait]
impl TourRequestRepository for InMemoryTourRequests {
    async fn save(&self, request: TourRequest) -> DomainResult<()> {
        match self.rows.entry(request.id.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "Tour request {} already exists",
                request.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(request);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<TourRequest>> {
        Ok(self.rows.get(id).map(|r| r.clone()))
    }

    async fn find_for_agent(&self, agent_id: &str) -> DomainResult<Vec<TourRequest>> {
        let mut found = self.collect(|r| r.agent_id == agent_id);
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_for_agent_with_status(
        &self,
        agent_id: &str,
        statuses: &[TourRequestStatus],
    ) -> DomainResult<Vec<TourRequest>> {
        let mut found = self.collect(|r| r.agent_id == agent_id && statuses.contains(&r.status));
        found.sort_by_key(|r| (r.requested_date.is_none(), r.requested_date));
        Ok(found)
    }

    async fn find_for_agent_since(
        &self,
        agent_id: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<TourRequest>> {
        let mut found = self.collect(|r| r.agent_id == agent_id && r.created_at >= since);
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }

    async fn count_for_agent_with_status(
        &self,
        agent_id: &str,
        status: TourRequestStatus,
    ) -> DomainResult<u64> {
        Ok(self
            .rows
            .iter()
            .filter(|e| e.agent_id == agent_id && e.status == status)
            .count() as u64)
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<TourRequest>> {
        Ok(self.collect(|r| r.is_overdue(now)))
    }

    async fn update_if_status(
        &self,
        request: &TourRequest,
        expected: TourRequestStatus,
    ) -> DomainResult<bool> {
        // get_mut holds the shard lock, so check and write are atomic
        match self.rows.get_mut(&request.id) {
            Some(mut stored) if stored.status == expected => {
                *stored = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ── Properties ──────────────────────────────────────────────────

#[derive(Default)]
struct InMemoryProperties {
    rows: DashMap<String, Property>,
}

#[async_trait]
impl PropertyRepository for InMemoryProperties {
    async fn save(&self, property: Property) -> DomainResult<()> {
        self.rows.insert(property.id.clone(), property);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Property>> {
        Ok(self.rows.get(id).map(|p| p.clone()))
    }

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<Property>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.rows.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn find_by_agent(&self, agent_id: &str) -> DomainResult<Vec<Property>> {
        let mut found: Vec<Property> = self
            .rows
            .iter()
            .filter(|e| e.listing_agent_id.as_deref() == Some(agent_id))
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(found)
    }
}

// ── Profiles ────────────────────────────────────────────────────

#[derive(Default)]
struct InMemoryProfiles {
    rows: DashMap<String, Profile>,
}

#[async_trait]
impl ProfileRepository for InMemoryProfiles {
    async fn save(&self, profile: Profile) -> DomainResult<()> {
        self.rows.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Profile>> {
        Ok(self.rows.get(id).map(|p| p.clone()))
    }

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<Profile>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.rows.get(id).map(|p| p.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn request(agent: &str, date: Option<NaiveDate>) -> TourRequest {
        TourRequest::new("user-1", "prop-1", agent, date, None, None, None)
    }

    #[tokio::test]
    async fn conditional_update_rejects_stale_status() {
        let repos = InMemoryRepositoryProvider::new();
        let original = request("agent-1", None);
        repos.tour_requests().save(original.clone()).await.unwrap();

        let mut cancelled = original.clone();
        cancelled.cancel(Utc::now()).unwrap();
        assert!(repos
            .tour_requests()
            .update_if_status(&cancelled, TourRequestStatus::Pending)
            .await
            .unwrap());

        let mut approved = original.clone();
        approved.approve(None, None, Utc::now()).unwrap();
        assert!(!repos
            .tour_requests()
            .update_if_status(&approved, TourRequestStatus::Pending)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn scheduled_listing_puts_undated_last() {
        let repos = InMemoryRepositoryProvider::new();
        let later = request("agent-1", NaiveDate::from_ymd_opt(2024, 6, 9));
        let undated = request("agent-1", None);
        let sooner = request("agent-1", NaiveDate::from_ymd_opt(2024, 6, 2));
        let other_agent = request("agent-2", NaiveDate::from_ymd_opt(2024, 6, 1));
        for r in [&later, &undated, &sooner, &other_agent] {
            repos.tour_requests().save(r.clone()).await.unwrap();
        }

        let found = repos
            .tour_requests()
            .find_for_agent_with_status("agent-1", &[TourRequestStatus::Pending])
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![sooner.id.as_str(), later.id.as_str(), undated.id.as_str()]);
    }

    #[tokio::test]
    async fn overdue_only_returns_pending_past_deadline() {
        let repos = InMemoryRepositoryProvider::new();
        let mut overdue = request("agent-1", None);
        overdue.expires_at = Some(Utc::now() - Duration::minutes(5));
        let mut fresh = request("agent-1", None);
        fresh.expires_at = Some(Utc::now() + Duration::hours(5));
        let mut answered = request("agent-1", None);
        answered.expires_at = Some(Utc::now() - Duration::minutes(5));
        answered.approve(None, None, Utc::now()).unwrap();

        for r in [&overdue, &fresh, &answered] {
            repos.tour_requests().save(r.clone()).await.unwrap();
        }

        let found = repos.tour_requests().find_overdue(Utc::now()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, overdue.id);
    }

    #[tokio::test]
    async fn duplicate_save_is_a_conflict() {
        let repos = InMemoryRepositoryProvider::new();
        let r = request("agent-1", None);
        repos.tour_requests().save(r.clone()).await.unwrap();
        let err = repos.tour_requests().save(r).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
