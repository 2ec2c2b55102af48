//! Calendar HTTP handlers

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::application::CalendarService;
use crate::interfaces::http::common::{domain_error_response, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AgentUser;

use super::dto::CalendarEventDto;

#[derive(Clone)]
pub struct CalendarState {
    pub service: Arc<CalendarService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/calendar/events",
    tag = "Calendar",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Approved and completed tours as calendar events", body = ApiResponse<Vec<CalendarEventDto>>),
        (status = 403, description = "Caller is not an agent")
    )
)]
pub async fn calendar_events(
    State(state): State<CalendarState>,
    agent: AgentUser,
) -> ApiResult<Vec<CalendarEventDto>> {
    let events = state
        .service
        .events_for_agent(agent.agent_id())
        .await
        .map_err(domain_error_response)?;

    Ok(Json(ApiResponse::success(
        events.into_iter().map(Into::into).collect(),
    )))
}
