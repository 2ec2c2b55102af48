//! Realtor API proxy handlers
//!
//! Keeps the RapidAPI key on the server. Successful upstream bodies are
//! returned unchanged.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;
use utoipa::IntoParams;

use crate::infrastructure::RealtorClient;
use crate::interfaces::http::common::{error_response, ApiError};
use crate::interfaces::http::middleware::AgentUser;
use crate::shared::errors::InfraError;

#[derive(Clone)]
pub struct RealtorState {
    pub client: Arc<RealtorClient>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PropertySearchParams {
    /// City, ZIP or address (required)
    pub location: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AgentSearchParams {
    /// City, ZIP or address (required)
    pub location: Option<String>,
    pub name: Option<String>,
}

fn required_location(location: Option<&str>) -> Result<&str, ApiError<Value>> {
    location
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Location parameter is required"))
}

fn upstream_error(what: &str, e: InfraError) -> ApiError<Value> {
    error!(error = %e, "Realtor API request failed");
    let message = match e {
        InfraError::Config(msg) => msg,
        InfraError::UpstreamStatus(code) => {
            format!("Failed to fetch {} data: Realtor API returned {}", what, code)
        }
        InfraError::Http(e) => format!("Failed to fetch {} data: {}", what, e),
    };
    error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

#[utoipa::path(
    get,
    path = "/api/v1/realtor/search",
    tag = "Realtor",
    security(("bearer_auth" = [])),
    params(PropertySearchParams),
    responses(
        (status = 200, description = "Upstream search result, unchanged"),
        (status = 400, description = "Missing location"),
        (status = 500, description = "API key missing or upstream failure")
    )
)]
pub async fn search_properties(
    State(state): State<RealtorState>,
    _agent: AgentUser,
    Query(params): Query<PropertySearchParams>,
) -> Result<Json<Value>, ApiError<Value>> {
    let location = required_location(params.location.as_deref())?;
    state
        .client
        .search_properties(location, params.query.as_deref())
        .await
        .map(Json)
        .map_err(|e| upstream_error("property", e))
}

#[utoipa::path(
    get,
    path = "/api/v1/realtor/agents/search",
    tag = "Realtor",
    security(("bearer_auth" = [])),
    params(AgentSearchParams),
    responses(
        (status = 200, description = "Upstream agent search result, unchanged"),
        (status = 400, description = "Missing location"),
        (status = 500, description = "API key missing or upstream failure")
    )
)]
pub async fn search_agents(
    State(state): State<RealtorState>,
    _agent: AgentUser,
    Query(params): Query<AgentSearchParams>,
) -> Result<Json<Value>, ApiError<Value>> {
    let location = required_location(params.location.as_deref())?;
    state
        .client
        .search_agents(location, params.name.as_deref())
        .await
        .map(Json)
        .map_err(|e| upstream_error("agent", e))
}
