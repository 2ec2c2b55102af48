//! Notification events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::tour_request::{TourRequest, TourRequestStatus};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    TourRequestCreated(TourRequestCreatedEvent),
    TourRequestStatusChanged(TourRequestStatusChangedEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::TourRequestCreated(_) => "tour_request_created",
            Event::TourRequestStatusChanged(_) => "tour_request_status_changed",
        }
    }

    /// Agent whose dashboards should hear about this event
    pub fn agent_id(&self) -> &str {
        match self {
            Event::TourRequestCreated(e) => &e.agent_id,
            Event::TourRequestStatusChanged(e) => &e.agent_id,
        }
    }

    pub fn created(request: &TourRequest) -> Self {
        Event::TourRequestCreated(TourRequestCreatedEvent {
            request_id: request.id.clone(),
            agent_id: request.agent_id.clone(),
            user_id: request.user_id.clone(),
            property_id: request.property_id.clone(),
            timestamp: request.created_at,
        })
    }

    pub fn status_changed(request: &TourRequest, old_status: TourRequestStatus) -> Self {
        Event::TourRequestStatusChanged(TourRequestStatusChangedEvent {
            request_id: request.id.clone(),
            agent_id: request.agent_id.clone(),
            user_id: request.user_id.clone(),
            old_status,
            new_status: request.status,
            timestamp: request.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourRequestCreatedEvent {
    pub request_id: String,
    pub agent_id: String,
    pub user_id: String,
    pub property_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourRequestStatusChangedEvent {
    pub request_id: String,
    pub agent_id: String,
    pub user_id: String,
    pub old_status: TourRequestStatus,
    pub new_status: TourRequestStatus,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_serializes_with_type_tag() {
        let mut request = TourRequest::new("u1", "p1", "a1", None, None, None, None);
        request.approve(None, None, Utc::now()).unwrap();
        let msg = EventMessage::new(Event::status_changed(&request, TourRequestStatus::Pending));

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "TourRequestStatusChanged");
        assert_eq!(json["data"]["agent_id"], "a1");
        assert_eq!(json["data"]["old_status"], "pending");
        assert_eq!(json["data"]["new_status"], "approved");
        assert_eq!(msg.event.event_type(), "tour_request_status_changed");
    }
}
