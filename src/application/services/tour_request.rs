//! Tour request lifecycle service
//!
//! Loads a request, applies the state machine move, persists it with a
//! compare-and-set on the previous status and publishes the resulting event.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{info, warn};

use crate::application::events::SharedEventBus;
use crate::domain::analytics::{count_by_status, filter_by_status, StatusCounts, StatusFilter};
use crate::domain::events::Event;
use crate::domain::{
    DomainError, DomainResult, RepositoryProvider, TimeSlot, TourRequest, TourRequestDetails,
    TourRequestStatus,
};

/// Input for a new tour request
#[derive(Debug, Clone)]
pub struct NewTourRequest {
    pub property_id: String,
    pub requested_date: Option<NaiveDate>,
    pub time_slot: Option<TimeSlot>,
    pub message: Option<String>,
}

/// Service for tour request business operations
pub struct TourRequestService {
    repos: Arc<dyn RepositoryProvider>,
    events: SharedEventBus,
    pending_ttl: Duration,
}

impl TourRequestService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, events: SharedEventBus, pending_ttl: Duration) -> Self {
        Self {
            repos,
            events,
            pending_ttl,
        }
    }

    // ── Creation ────────────────────────────────────────────────

    /// A requester asks to tour a property. The listing agent becomes the
    /// owner of the decision.
    pub async fn create(&self, requester_id: &str, input: NewTourRequest) -> DomainResult<TourRequest> {
        let property = self
            .repos
            .properties()
            .find_by_id(&input.property_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Property", &input.property_id))?;

        let agent_id = property.listing_agent_id.ok_or_else(|| {
            DomainError::Validation(format!("Property {} has no listing agent", property.id))
        })?;

        let expires_at = Utc::now()
            .checked_add_signed(self.pending_ttl)
            .ok_or_else(|| DomainError::Validation("Pending TTL is out of range".to_string()))?;

        let message = input.message.filter(|m| !m.trim().is_empty());
        let request = TourRequest::new(
            requester_id,
            property.id,
            agent_id,
            input.requested_date,
            input.time_slot,
            message,
            Some(expires_at),
        );

        self.repos.tour_requests().save(request.clone()).await?;

        info!(
            request_id = %request.id,
            agent_id = %request.agent_id,
            user_id = %request.user_id,
            "Tour request created"
        );
        metrics::counter!("tour_request_transitions_total", "to" => "pending").increment(1);
        self.events.publish(Event::created(&request));

        Ok(request)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Agent's requests, newest first, joined with property and requester
    pub async fn list_for_agent(
        &self,
        agent_id: &str,
        filter: StatusFilter,
    ) -> DomainResult<Vec<TourRequestDetails>> {
        let all = self.repos.tour_requests().find_for_agent(agent_id).await?;
        self.with_details(filter_by_status(all, filter)).await
    }

    /// Approved and completed requests, ordered by requested date
    pub async fn scheduled_for_agent(&self, agent_id: &str) -> DomainResult<Vec<TourRequestDetails>> {
        let scheduled = self
            .repos
            .tour_requests()
            .find_for_agent_with_status(
                agent_id,
                &[TourRequestStatus::Approved, TourRequestStatus::Completed],
            )
            .await?;
        self.with_details(scheduled).await
    }

    pub async fn pending_count(&self, agent_id: &str) -> DomainResult<u64> {
        self.repos
            .tour_requests()
            .count_for_agent_with_status(agent_id, TourRequestStatus::Pending)
            .await
    }

    pub async fn stats(&self, agent_id: &str) -> DomainResult<StatusCounts> {
        let all = self.repos.tour_requests().find_for_agent(agent_id).await?;
        Ok(count_by_status(&all))
    }

    /// Single request as seen by its agent or its requester
    pub async fn get(&self, viewer_id: &str, id: &str) -> DomainResult<TourRequestDetails> {
        let request = self.load(id).await?;
        if request.agent_id != viewer_id && request.user_id != viewer_id {
            return Err(DomainError::Forbidden(
                "Not a party to this tour request".to_string(),
            ));
        }
        self.with_details(vec![request])
            .await?
            .pop()
            .ok_or_else(|| DomainError::not_found("TourRequest", id))
    }

    // ── Transitions ─────────────────────────────────────────────

    pub async fn approve(
        &self,
        agent_id: &str,
        id: &str,
        response_message: Option<String>,
        scheduled_date: Option<NaiveDate>,
    ) -> DomainResult<TourRequest> {
        let mut request = self.load_owned(agent_id, id).await?;
        let previous = request.status;
        let message = response_message.filter(|m| !m.trim().is_empty());
        request.approve(message, scheduled_date, Utc::now())?;
        self.commit(request, previous).await
    }

    pub async fn deny(&self, agent_id: &str, id: &str, reason: &str) -> DomainResult<TourRequest> {
        if reason.trim().is_empty() {
            return Err(DomainError::Validation(
                "A reason is required to deny a tour request".to_string(),
            ));
        }
        let mut request = self.load_owned(agent_id, id).await?;
        let previous = request.status;
        request.deny(reason.trim(), Utc::now())?;
        self.commit(request, previous).await
    }

    /// Withdraw a request. Allowed for the requester and the owning agent.
    pub async fn cancel(&self, actor_id: &str, id: &str) -> DomainResult<TourRequest> {
        let mut request = self.load(id).await?;
        if request.user_id != actor_id && request.agent_id != actor_id {
            return Err(DomainError::Forbidden(
                "Only the requester or the listing agent can cancel".to_string(),
            ));
        }
        let previous = request.status;
        request.cancel(Utc::now())?;
        self.commit(request, previous).await
    }

    pub async fn mark_completed(&self, agent_id: &str, id: &str) -> DomainResult<TourRequest> {
        let mut request = self.load_owned(agent_id, id).await?;
        let previous = request.status;
        request.mark_completed(Utc::now())?;
        self.commit(request, previous).await
    }

    /// Expires every pending request whose deadline is before `now`.
    /// Returns how many were expired.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let overdue = self.repos.tour_requests().find_overdue(now).await?;
        if overdue.is_empty() {
            return Ok(0);
        }

        info!(count = overdue.len(), "Expiring overdue tour requests");

        let mut expired = 0;
        for mut request in overdue {
            let previous = request.status;
            match request.expire(now) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(request_id = %request.id, error = %e, "Skipping expiry");
                    continue;
                }
            }
            match self.commit(request, previous).await {
                Ok(_) => expired += 1,
                // Answered between the scan and the update
                Err(DomainError::Conflict(_)) => continue,
                Err(e) => warn!(error = %e, "Failed to expire tour request"),
            }
        }

        metrics::counter!("tour_requests_expired_total").increment(expired as u64);
        Ok(expired)
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn load(&self, id: &str) -> DomainResult<TourRequest> {
        self.repos
            .tour_requests()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("TourRequest", id))
    }

    async fn load_owned(&self, agent_id: &str, id: &str) -> DomainResult<TourRequest> {
        let request = self.load(id).await?;
        if request.agent_id != agent_id {
            return Err(DomainError::Forbidden(
                "Tour request belongs to another agent".to_string(),
            ));
        }
        Ok(request)
    }

    async fn commit(&self, request: TourRequest, previous: TourRequestStatus) -> DomainResult<TourRequest> {
        let applied = self
            .repos
            .tour_requests()
            .update_if_status(&request, previous)
            .await?;

        if !applied {
            warn!(
                request_id = %request.id,
                expected = %previous,
                "Tour request changed concurrently"
            );
            return Err(DomainError::Conflict(format!(
                "Tour request {} was modified by someone else",
                request.id
            )));
        }

        info!(
            request_id = %request.id,
            agent_id = %request.agent_id,
            from = %previous,
            to = %request.status,
            "Tour request status changed"
        );
        metrics::counter!("tour_request_transitions_total", "to" => request.status.as_str())
            .increment(1);
        self.events.publish(Event::status_changed(&request, previous));

        Ok(request)
    }

    async fn with_details(&self, requests: Vec<TourRequest>) -> DomainResult<Vec<TourRequestDetails>> {
        let property_ids: Vec<String> = unique(requests.iter().map(|r| r.property_id.as_str()));
        let user_ids: Vec<String> = unique(requests.iter().map(|r| r.user_id.as_str()));

        let properties: HashMap<String, _> = self
            .repos
            .properties()
            .find_by_ids(&property_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        let users: HashMap<String, _> = self
            .repos
            .profiles()
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        Ok(requests
            .into_iter()
            .map(|request| TourRequestDetails {
                property: properties.get(&request.property_id).cloned(),
                user: users.get(&request.user_id).cloned(),
                request,
            })
            .collect())
    }
}

fn unique<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).map(str::to_string).collect()
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::create_event_bus;
    use crate::domain::{Profile, Property};
    use crate::infrastructure::InMemoryRepositoryProvider;

    struct Fixture {
        service: TourRequestService,
        events: SharedEventBus,
        property_id: String,
    }

    async fn fixture() -> Fixture {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
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

        let events = create_event_bus();
        Fixture {
            service: TourRequestService::new(repos, events.clone(), Duration::hours(48)),
            events,
            property_id,
        }
    }

    fn input(property_id: &str) -> NewTourRequest {
        NewTourRequest {
            property_id: property_id.to_string(),
            requested_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            time_slot: Some(TimeSlot::Morning),
            message: Some("Is parking available?".into()),
        }
    }

    #[tokio::test]
    async fn create_with_unrepresentable_ttl_is_rejected() {
        let f = fixture().await;
        let service = TourRequestService::new(
            f.service.repos.clone(),
            f.events.clone(),
            Duration::days(1_000_000_000),
        );

        let err = service.create("user-1", input(&f.property_id)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(f.service.pending_count("agent-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_routes_request_to_listing_agent() {
        let f = fixture().await;
        let mut sub = f.events.subscribe();

        let created = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        assert_eq!(created.agent_id, "agent-1");
        assert_eq!(created.status, TourRequestStatus::Pending);
        let ttl = created.expires_at.unwrap() - created.created_at;
        assert!(ttl > Duration::hours(47) && ttl <= Duration::hours(48));

        let msg = sub.recv().await.unwrap();
        assert_eq!(msg.event.event_type(), "tour_request_created");
        assert_eq!(msg.event.agent_id(), "agent-1");
    }

    #[tokio::test]
    async fn create_for_unknown_property_is_not_found() {
        let f = fixture().await;
        let err = f.service.create("user-1", input("missing")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn approve_then_complete_publishes_each_change() {
        let f = fixture().await;
        let created = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        let mut sub = f.events.subscribe();

        let approved = f
            .service
            .approve("agent-1", &created.id, Some("See you at 9".into()), None)
            .await
            .unwrap();
        assert_eq!(approved.status, TourRequestStatus::Approved);
        assert_eq!(approved.agent_response_message.as_deref(), Some("See you at 9"));
        assert!(approved.responded_at.is_some());

        f.service.mark_completed("agent-1", &created.id).await.unwrap();

        let first = sub.recv().await.unwrap();
        let second = sub.recv().await.unwrap();
        match (first.event, second.event) {
            (Event::TourRequestStatusChanged(a), Event::TourRequestStatusChanged(b)) => {
                assert_eq!(a.old_status, TourRequestStatus::Pending);
                assert_eq!(a.new_status, TourRequestStatus::Approved);
                assert_eq!(b.new_status, TourRequestStatus::Completed);
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[tokio::test]
    async fn re_approving_is_rejected() {
        let f = fixture().await;
        let created = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        f.service.deny("agent-1", &created.id, "Sold").await.unwrap();

        let err = f
            .service
            .approve("agent-1", &created.id, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        let stored = f.service.get("agent-1", &created.id).await.unwrap();
        assert_eq!(stored.request.status, TourRequestStatus::Denied);
        assert_eq!(stored.request.agent_response_message.as_deref(), Some("Sold"));
    }

    #[tokio::test]
    async fn deny_requires_reason() {
        let f = fixture().await;
        let created = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        let err = f.service.deny("agent-1", &created.id, "   ").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn other_agents_cannot_decide() {
        let f = fixture().await;
        let created = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        let err = f
            .service
            .approve("agent-2", &created.id, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn requester_can_cancel_approved_tour() {
        let f = fixture().await;
        let created = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        f.service.approve("agent-1", &created.id, None, None).await.unwrap();

        let cancelled = f.service.cancel("user-1", &created.id).await.unwrap();
        assert_eq!(cancelled.status, TourRequestStatus::Cancelled);

        let err = f.service.cancel("stranger", &created.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn expiry_only_touches_overdue_pending() {
        let f = fixture().await;
        let stale = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        let answered = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        f.service.approve("agent-1", &answered.id, None, None).await.unwrap();

        assert_eq!(f.service.expire_overdue(Utc::now()).await.unwrap(), 0);

        let past_deadline = Utc::now() + Duration::hours(49);
        assert_eq!(f.service.expire_overdue(past_deadline).await.unwrap(), 1);

        let stale = f.service.get("agent-1", &stale.id).await.unwrap();
        assert_eq!(stale.request.status, TourRequestStatus::Expired);
        let answered = f.service.get("agent-1", &answered.id).await.unwrap();
        assert_eq!(answered.request.status, TourRequestStatus::Approved);
    }

    #[tokio::test]
    async fn listing_joins_property_and_requester() {
        let f = fixture().await;
        let a = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        let b = f.service.create("user-1", input(&f.property_id)).await.unwrap();
        f.service.approve("agent-1", &b.id, None, None).await.unwrap();

        let pending = f
            .service
            .list_for_agent("agent-1", StatusFilter::Only(TourRequestStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request.id, a.id);
        assert_eq!(pending[0].property.as_ref().unwrap().address, "12 Oak St");
        assert_eq!(
            pending[0].user.as_ref().unwrap().full_name.as_deref(),
            Some("Sam Buyer")
        );

        let all = f.service.list_for_agent("agent-1", StatusFilter::All).await.unwrap();
        assert_eq!(all.len(), 2);

        assert_eq!(f.service.pending_count("agent-1").await.unwrap(), 1);
        let stats = f.service.stats("agent-1").await.unwrap();
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.approved, 1);
    }
}
