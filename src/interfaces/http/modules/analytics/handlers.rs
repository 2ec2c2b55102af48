//! Analytics API handlers
//!
//! Aggregation happens in `domain::analytics`; these handlers only scope the
//! data to the calling agent and shape the response.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use super::dto::*;
use crate::application::AnalyticsService;
use crate::interfaces::http::common::{domain_error_response, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AgentUser;

/// Analytics handler state.
#[derive(Clone)]
pub struct AnalyticsState {
    pub service: Arc<AnalyticsService>,
}

// ── Query params ───────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
pub struct TrendParams {
    /// Number of days to look back (default 30, max 365)
    pub days: Option<u32>,
}

// ── Endpoints ──────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/analytics/status-distribution",
    tag = "Analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Share of requests per status, largest first", body = ApiResponse<Vec<StatusShareDto>>)
    )
)]
pub async fn status_distribution(
    State(state): State<AnalyticsState>,
    agent: AgentUser,
) -> ApiResult<Vec<StatusShareDto>> {
    let shares = state
        .service
        .status_distribution(agent.agent_id())
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(
        shares.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/trend",
    tag = "Analytics",
    security(("bearer_auth" = [])),
    params(TrendParams),
    responses(
        (status = 200, description = "Requests per day, oldest first", body = ApiResponse<Vec<TrendPointDto>>)
    )
)]
pub async fn requests_trend(
    State(state): State<AnalyticsState>,
    agent: AgentUser,
    Query(params): Query<TrendParams>,
) -> ApiResult<Vec<TrendPointDto>> {
    let days = params.days.unwrap_or(30);
    let points = state
        .service
        .trend(agent.agent_id(), days)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(
        points.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/property-performance",
    tag = "Analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Most requested listings", body = ApiResponse<Vec<PropertyPerformanceDto>>)
    )
)]
pub async fn property_performance(
    State(state): State<AnalyticsState>,
    agent: AgentUser,
) -> ApiResult<Vec<PropertyPerformanceDto>> {
    let rows = state
        .service
        .property_performance(agent.agent_id())
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/conversion",
    tag = "Analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Views to completed tours funnel", body = ApiResponse<ConversionMetricsDto>)
    )
)]
pub async fn conversion_metrics(
    State(state): State<AnalyticsState>,
    agent: AgentUser,
) -> ApiResult<ConversionMetricsDto> {
    let metrics = state
        .service
        .conversion(agent.agent_id())
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(metrics.into())))
}
