//! Tour request HTTP handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::application::{NewTourRequest, TourRequestService};
use crate::domain::analytics::StatusFilter;
use crate::domain::TimeSlot;
use crate::interfaces::http::common::{
    domain_error_response, error_response, ApiResponse, ApiResult, ValidatedJson,
};
use crate::interfaces::http::middleware::{AgentUser, AuthenticatedUser};

use super::dto::*;

/// Application state for tour request handlers.
#[derive(Clone)]
pub struct TourRequestState {
    pub service: Arc<TourRequestService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/tour-requests",
    tag = "Tour Requests",
    security(("bearer_auth" = [])),
    request_body = CreateTourRequest,
    responses(
        (status = 201, description = "Tour request created", body = ApiResponse<TourRequestDto>),
        (status = 404, description = "Property not found"),
        (status = 422, description = "Invalid request")
    )
)]
pub async fn create_tour_request(
    State(state): State<TourRequestState>,
    user: AuthenticatedUser,
    ValidatedJson(body): ValidatedJson<CreateTourRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TourRequestDto>>), (StatusCode, Json<ApiResponse<TourRequestDto>>)> {
    let input = NewTourRequest {
        property_id: body.property_id,
        requested_date: body.requested_date,
        time_slot: body.requested_time_slot.as_deref().and_then(TimeSlot::parse),
        message: body.message,
    };

    let created = state
        .service
        .create(&user.profile_id, input)
        .await
        .map_err(domain_error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/tour-requests",
    tag = "Tour Requests",
    security(("bearer_auth" = [])),
    params(StatusFilterQuery),
    responses(
        (status = 200, description = "Agent's tour requests, newest first", body = ApiResponse<Vec<TourRequestDetailsDto>>),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Caller is not an agent")
    )
)]
pub async fn list_tour_requests(
    State(state): State<TourRequestState>,
    agent: AgentUser,
    Query(query): Query<StatusFilterQuery>,
) -> ApiResult<Vec<TourRequestDetailsDto>> {
    let filter = match query.status.as_deref() {
        None | Some("") => StatusFilter::All,
        Some(raw) => StatusFilter::parse(raw).ok_or_else(|| {
            error_response(StatusCode::BAD_REQUEST, format!("Unknown status '{}'", raw))
        })?,
    };

    let requests = state
        .service
        .list_for_agent(agent.agent_id(), filter)
        .await
        .map_err(domain_error_response)?;

    Ok(Json(ApiResponse::success(
        requests.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/tour-requests/pending-count",
    tag = "Tour Requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending requests awaiting the agent", body = ApiResponse<PendingCountDto>),
        (status = 403, description = "Caller is not an agent")
    )
)]
pub async fn pending_count(
    State(state): State<TourRequestState>,
    agent: AgentUser,
) -> ApiResult<PendingCountDto> {
    let count = state
        .service
        .pending_count(agent.agent_id())
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(PendingCountDto { count })))
}

#[utoipa::path(
    get,
    path = "/api/v1/tour-requests/stats",
    tag = "Tour Requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Requests per status", body = ApiResponse<TourRequestStatsDto>),
        (status = 403, description = "Caller is not an agent")
    )
)]
pub async fn tour_request_stats(
    State(state): State<TourRequestState>,
    agent: AgentUser,
) -> ApiResult<TourRequestStatsDto> {
    let counts = state
        .service
        .stats(agent.agent_id())
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(counts.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/tour-requests/{id}",
    tag = "Tour Requests",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Tour request ID")),
    responses(
        (status = 200, description = "Tour request details", body = ApiResponse<TourRequestDetailsDto>),
        (status = 403, description = "Caller is neither the agent nor the requester"),
        (status = 404, description = "Tour request not found")
    )
)]
pub async fn get_tour_request(
    State(state): State<TourRequestState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<TourRequestDetailsDto> {
    let details = state
        .service
        .get(&user.profile_id, &id)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(details.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/tour-requests/{id}/approve",
    tag = "Tour Requests",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Tour request ID")),
    request_body = ApproveTourRequest,
    responses(
        (status = 200, description = "Tour request approved", body = ApiResponse<TourRequestDto>),
        (status = 403, description = "Not the listing agent"),
        (status = 404, description = "Tour request not found"),
        (status = 409, description = "Tour request is not pending")
    )
)]
pub async fn approve_tour_request(
    State(state): State<TourRequestState>,
    agent: AgentUser,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<ApproveTourRequest>,
) -> ApiResult<TourRequestDto> {
    let approved = state
        .service
        .approve(agent.agent_id(), &id, body.response_message, body.scheduled_date)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(approved.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/tour-requests/{id}/deny",
    tag = "Tour Requests",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Tour request ID")),
    request_body = DenyTourRequest,
    responses(
        (status = 200, description = "Tour request denied", body = ApiResponse<TourRequestDto>),
        (status = 403, description = "Not the listing agent"),
        (status = 404, description = "Tour request not found"),
        (status = 409, description = "Tour request is not pending"),
        (status = 422, description = "Reason missing")
    )
)]
pub async fn deny_tour_request(
    State(state): State<TourRequestState>,
    agent: AgentUser,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<DenyTourRequest>,
) -> ApiResult<TourRequestDto> {
    let denied = state
        .service
        .deny(agent.agent_id(), &id, &body.reason)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(denied.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/tour-requests/{id}/complete",
    tag = "Tour Requests",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Tour request ID")),
    responses(
        (status = 200, description = "Tour marked as completed", body = ApiResponse<TourRequestDto>),
        (status = 403, description = "Not the listing agent"),
        (status = 404, description = "Tour request not found"),
        (status = 409, description = "Tour request is not approved")
    )
)]
pub async fn complete_tour_request(
    State(state): State<TourRequestState>,
    agent: AgentUser,
    Path(id): Path<String>,
) -> ApiResult<TourRequestDto> {
    let completed = state
        .service
        .mark_completed(agent.agent_id(), &id)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(completed.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/tour-requests/{id}/cancel",
    tag = "Tour Requests",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Tour request ID")),
    responses(
        (status = 200, description = "Tour request cancelled", body = ApiResponse<TourRequestDto>),
        (status = 403, description = "Neither the requester nor the listing agent"),
        (status = 404, description = "Tour request not found"),
        (status = 409, description = "Tour request is already closed")
    )
)]
pub async fn cancel_tour_request(
    State(state): State<TourRequestState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<TourRequestDto> {
    let cancelled = state
        .service
        .cancel(&user.profile_id, &id)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(cancelled.into())))
}
