//! Tour request domain entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::profile::Profile;
use crate::domain::property::Property;

/// Tour request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourRequestStatus {
    /// Waiting for the agent's answer
    Pending,
    /// Accepted by the agent; shows up on the calendar
    Approved,
    /// Rejected by the agent
    Denied,
    /// Withdrawn by the requester (or the agent)
    Cancelled,
    /// Nobody answered before `expires_at`
    Expired,
    /// The tour took place
    Completed,
}

impl TourRequestStatus {
    pub const ALL: [TourRequestStatus; 6] = [
        Self::Pending,
        Self::Approved,
        Self::Denied,
        Self::Cancelled,
        Self::Expired,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Completed => "completed",
        }
    }

    /// Parses a stored status. Only the exact lowercase names are accepted,
    /// the same text the status filters in SQL compare against.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            "cancelled" => Some(Self::Cancelled),
            "expired" => Some(Self::Expired),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: TourRequestStatus) -> bool {
        use TourRequestStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Denied)
                | (Pending, Cancelled)
                | (Pending, Expired)
                | (Approved, Completed)
                | (Approved, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Approved)
    }

    /// Statuses that are materialized as calendar events.
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }
}

impl std::fmt::Display for TourRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested part of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Some(Self::Morning),
            "afternoon" => Some(Self::Afternoon),
            "evening" => Some(Self::Evening),
            _ => None,
        }
    }
}

/// Rejected state machine move
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot move tour request from {from} to {to}")]
pub struct TransitionError {
    pub from: TourRequestStatus,
    pub to: TourRequestStatus,
}

impl From<TransitionError> for crate::shared::errors::DomainError {
    fn from(e: TransitionError) -> Self {
        Self::InvalidTransition {
            from: e.from.to_string(),
            to: e.to.to_string(),
        }
    }
}

/// A prospective buyer's request to view a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourRequest {
    pub id: String,
    /// Requester profile ID
    pub user_id: String,
    pub property_id: String,
    /// Listing agent that owns the decision
    pub agent_id: String,
    pub requested_date: Option<NaiveDate>,
    /// Raw slot as submitted; unknown values fall back to the default window
    pub requested_time_slot: Option<String>,
    pub message: Option<String>,
    pub status: TourRequestStatus,
    pub agent_response_message: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TourRequest {
    pub fn new(
        user_id: impl Into<String>,
        property_id: impl Into<String>,
        agent_id: impl Into<String>,
        requested_date: Option<NaiveDate>,
        requested_time_slot: Option<TimeSlot>,
        message: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            property_id: property_id.into(),
            agent_id: agent_id.into(),
            requested_date,
            requested_time_slot: requested_time_slot.map(|s| s.as_str().to_string()),
            message,
            status: TourRequestStatus::Pending,
            agent_response_message: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
            expires_at,
        }
    }

    pub fn time_slot(&self) -> Option<TimeSlot> {
        self.requested_time_slot.as_deref().and_then(TimeSlot::parse)
    }

    fn transition(
        &mut self,
        next: TourRequestStatus,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Agent accepts the request, optionally moving it to another day.
    pub fn approve(
        &mut self,
        response_message: Option<String>,
        scheduled_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.transition(TourRequestStatus::Approved, now)?;
        self.agent_response_message = response_message;
        if scheduled_date.is_some() {
            self.requested_date = scheduled_date;
        }
        self.responded_at = Some(now);
        Ok(())
    }

    pub fn deny(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TourRequestStatus::Denied, now)?;
        self.agent_response_message = Some(reason.into());
        self.responded_at = Some(now);
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TourRequestStatus::Cancelled, now)
    }

    pub fn mark_completed(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TourRequestStatus::Completed, now)
    }

    /// Expires a pending request whose deadline has passed.
    ///
    /// Returns `Ok(false)` when the deadline is absent or still ahead.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<bool, TransitionError> {
        if !self.is_overdue(now) {
            return Ok(false);
        }
        self.transition(TourRequestStatus::Expired, now)?;
        Ok(true)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TourRequestStatus::Pending
            && self.expires_at.is_some_and(|deadline| deadline < now)
    }
}

/// Tour request joined with its property and requester profile
#[derive(Debug, Clone, Serialize)]
pub struct TourRequestDetails {
    #[serde(flatten)]
    pub request: TourRequest,
    pub property: Option<Property>,
    pub user: Option<Profile>,
}

// ── Tests ──────────────────────────────────────────────────────
