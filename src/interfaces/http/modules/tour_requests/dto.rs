//! Tour request DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::analytics::StatusCounts;
use crate::domain::{Profile, Property, TimeSlot, TourRequest, TourRequestDetails};

fn validate_time_slot(slot: &str) -> Result<(), ValidationError> {
    match TimeSlot::parse(slot) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("time_slot")
            .with_message("must be morning, afternoon or evening".into())),
    }
}

/// Request to tour a property
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTourRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub property_id: String,
    /// Preferred day (YYYY-MM-DD)
    pub requested_date: Option<NaiveDate>,
    /// morning, afternoon or evening
    #[validate(custom(function = "validate_time_slot"))]
    pub requested_time_slot: Option<String>,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

/// Agent accepts a request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ApproveTourRequest {
    #[validate(length(max = 2000))]
    pub response_message: Option<String>,
    /// Moves the tour to another day
    pub scheduled_date: Option<NaiveDate>,
}

/// Agent rejects a request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DenyTourRequest {
    #[validate(length(min = 1, max = 2000, message = "is required"))]
    pub reason: String,
}

/// `?status=all|pending|approved|denied|cancelled|expired|completed`
#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusFilterQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TourRequestDto {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub agent_id: String,
    pub requested_date: Option<NaiveDate>,
    pub requested_time_slot: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub agent_response_message: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<TourRequest> for TourRequestDto {
    fn from(r: TourRequest) -> Self {
        Self {
            status: r.status.as_str().to_string(),
            id: r.id,
            user_id: r.user_id,
            property_id: r.property_id,
            agent_id: r.agent_id,
            requested_date: r.requested_date,
            requested_time_slot: r.requested_time_slot,
            message: r.message,
            agent_response_message: r.agent_response_message,
            responded_at: r.responded_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
            expires_at: r.expires_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PropertySummaryDto {
    pub id: String,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub full_address: String,
}

impl From<Property> for PropertySummaryDto {
    fn from(p: Property) -> Self {
        Self {
            full_address: p.full_address(),
            id: p.id,
            address: p.address,
            city: p.city,
            state: p.state,
            zip_code: p.zip_code,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileSummaryDto {
    pub id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl From<Profile> for ProfileSummaryDto {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            full_name: p.full_name,
            email: p.email,
        }
    }
}

/// Tour request with its property and requester
#[derive(Debug, Serialize, ToSchema)]
pub struct TourRequestDetailsDto {
    #[serde(flatten)]
    pub request: TourRequestDto,
    pub property: Option<PropertySummaryDto>,
    pub user: Option<ProfileSummaryDto>,
}

impl From<TourRequestDetails> for TourRequestDetailsDto {
    fn from(d: TourRequestDetails) -> Self {
        Self {
            request: d.request.into(),
            property: d.property.map(Into::into),
            user: d.user.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingCountDto {
    pub count: u64,
}

/// Badge counts for the status tabs
#[derive(Debug, Serialize, ToSchema)]
pub struct TourRequestStatsDto {
    pub pending: u64,
    pub approved: u64,
    pub denied: u64,
    pub cancelled: u64,
    pub expired: u64,
    pub completed: u64,
    pub total: u64,
}

impl From<StatusCounts> for TourRequestStatsDto {
    fn from(c: StatusCounts) -> Self {
        Self {
            total: c.total(),
            pending: c.pending,
            approved: c.approved,
            denied: c.denied,
            cancelled: c.cancelled,
            expired: c.expired,
            completed: c.completed,
        }
    }
}
