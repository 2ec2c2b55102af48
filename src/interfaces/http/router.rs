//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{AnalyticsService, CalendarService, SharedEventBus, TourRequestService};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::RealtorClient;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{analytics, calendar, health, realtor, tour_requests};
use crate::interfaces::ws::{ws_notifications_handler, NotificationState};

/// Everything the HTTP layer needs from the rest of the service
#[derive(Clone)]
pub struct ApiContext {
    pub repos: Arc<dyn RepositoryProvider>,
    pub tour_requests: Arc<TourRequestService>,
    pub calendar: Arc<CalendarService>,
    pub analytics: Arc<AnalyticsService>,
    pub realtor: Arc<RealtorClient>,
    pub event_bus: SharedEventBus,
    pub jwt_config: JwtConfig,
    /// `None` on the in-memory store
    pub db: Option<DatabaseConnection>,
    /// `None` when no Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the auth provider"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Tour requests
        tour_requests::create_tour_request,
        tour_requests::list_tour_requests,
        tour_requests::pending_count,
        tour_requests::tour_request_stats,
        tour_requests::get_tour_request,
        tour_requests::approve_tour_request,
        tour_requests::deny_tour_request,
        tour_requests::complete_tour_request,
        tour_requests::cancel_tour_request,
        // Calendar
        calendar::calendar_events,
        // Analytics
        analytics::status_distribution,
        analytics::requests_trend,
        analytics::property_performance,
        analytics::conversion_metrics,
        // Realtor
        realtor::search_properties,
        realtor::search_agents,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            tour_requests::CreateTourRequest,
            tour_requests::ApproveTourRequest,
            tour_requests::DenyTourRequest,
            tour_requests::TourRequestDto,
            tour_requests::TourRequestDetailsDto,
            tour_requests::PropertySummaryDto,
            tour_requests::ProfileSummaryDto,
            tour_requests::PendingCountDto,
            tour_requests::TourRequestStatsDto,
            calendar::CalendarEventDto,
            calendar::CalendarEventPropsDto,
            analytics::StatusShareDto,
            analytics::TrendPointDto,
            analytics::PropertyPerformanceDto,
            analytics::ConversionMetricsDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check"),
        (name = "Tour Requests", description = "Tour request lifecycle: create, approve, deny, cancel, complete"),
        (name = "Calendar", description = "Approved and completed tours as calendar events"),
        (name = "Analytics", description = "Dashboard charts over the agent's tour requests"),
        (name = "Realtor", description = "Server-side proxy to the Realtor search API"),
    ),
    info(
        title = "Tour Desk API",
        version = "1.0.0",
        description = "Tour request management for real-estate agent dashboards",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
        repos: ctx.repos.clone(),
    };

    // ── Tour requests ──────────────────────────────────────────
    let tour_request_routes = Router::new()
        .route(
            "/",
            get(tour_requests::list_tour_requests).post(tour_requests::create_tour_request),
        )
        .route("/pending-count", get(tour_requests::pending_count))
        .route("/stats", get(tour_requests::tour_request_stats))
        .route("/{id}", get(tour_requests::get_tour_request))
        .route("/{id}/approve", post(tour_requests::approve_tour_request))
        .route("/{id}/deny", post(tour_requests::deny_tour_request))
        .route("/{id}/complete", post(tour_requests::complete_tour_request))
        .route("/{id}/cancel", post(tour_requests::cancel_tour_request))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(tour_requests::TourRequestState {
            service: ctx.tour_requests.clone(),
        });

    // ── Calendar ───────────────────────────────────────────────
    let calendar_routes = Router::new()
        .route("/events", get(calendar::calendar_events))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(calendar::CalendarState {
            service: ctx.calendar.clone(),
        });

    // ── Analytics ──────────────────────────────────────────────
    let analytics_routes = Router::new()
        .route("/status-distribution", get(analytics::status_distribution))
        .route("/trend", get(analytics::requests_trend))
        .route("/property-performance", get(analytics::property_performance))
        .route("/conversion", get(analytics::conversion_metrics))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(analytics::AnalyticsState {
            service: ctx.analytics.clone(),
        });

    // ── Realtor proxy ──────────────────────────────────────────
    let realtor_routes = Router::new()
        .route("/search", get(realtor::search_properties))
        .route("/agents/search", get(realtor::search_agents))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(realtor::RealtorState {
            client: ctx.realtor.clone(),
        });

    // Notification WebSocket (authenticates during the handshake)
    let notification_routes = Router::new()
        .route("/ws", get(ws_notifications_handler))
        .with_state(NotificationState {
            event_bus: ctx.event_bus.clone(),
            auth: auth_state,
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: ctx.db.clone(),
            event_bus: ctx.event_bus.clone(),
            started_at: Arc::new(Instant::now()),
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/v1/tour-requests", tour_request_routes)
        .nest("/api/v1/calendar", calendar_routes)
        .nest("/api/v1/analytics", analytics_routes)
        .nest("/api/v1/realtor", realtor_routes)
        .nest("/api/v1/notifications", notification_routes);

    if let Some(handle) = ctx.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Duration;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::create_event_bus;
    use crate::domain::{Profile, Property};
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::{InMemoryRepositoryProvider, RealtorConfig};

    struct TestApp {
        router: Router,
        jwt: JwtConfig,
        property_id: String,
    }

    async fn app() -> TestApp {
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
        let property = Property::new("12 Oak St", Some("agent-1".into()))
            .with_locality("Austin", "TX", "78701");
        let property_id = property.id.clone();
        repos.properties().save(property).await.unwrap();

        let event_bus = create_event_bus();
        let tours = Arc::new(TourRequestService::new(
            repos.clone(),
            event_bus.clone(),
            Duration::hours(48),
        ));
        let jwt = JwtConfig {
            secret: "router-test".into(),
            audience: Some("authenticated".into()),
            expiration_hours: 1,
        };

        let router = create_api_router(ApiContext {
            repos: repos.clone(),
            tour_requests: tours.clone(),
            calendar: Arc::new(CalendarService::new(tours)),
            analytics: Arc::new(AnalyticsService::new(repos.clone())),
            realtor: Arc::new(RealtorClient::new(&RealtorConfig::default()).unwrap()),
            event_bus,
            jwt_config: jwt.clone(),
            db: None,
            metrics: None,
        });

        TestApp {
            router,
            jwt,
            property_id,
        }
    }

    impl TestApp {
        fn token(&self, profile_id: &str) -> String {
            create_token(profile_id, None, &self.jwt).unwrap()
        }

        async fn call(&self, method: &str, uri: &str, as_user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(user) = as_user {
                builder = builder.header("authorization", format!("Bearer {}", self.token(user)));
            }
            let body = match body {
                Some(v) => {
                    builder = builder.header("content-type", "application/json");
                    Body::from(v.to_string())
                }
                None => Body::empty(),
            };

            let response = self
                .router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }

        async fn create_request(&self) -> String {
            let (status, body) = self
                .call(
                    "POST",
                    "/api/v1/tour-requests",
                    Some("user-1"),
                    Some(json!({
                        "property_id": self.property_id,
                        "requested_date": "2024-06-01",
                        "requested_time_slot": "morning",
                        "message": "Is there parking?"
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            body["data"]["id"].as_str().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn health_reports_memory_store() {
        let app = app().await;
        let (status, body) = app.call("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"]["status"], "memory");
    }

    #[tokio::test]
    async fn missing_token_is_401() {
        let app = app().await;
        let (status, body) = app.call("GET", "/api/v1/tour-requests", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn non_agent_gets_not_agent() {
        let app = app().await;
        let (status, body) = app
            .call("GET", "/api/v1/tour-requests/pending-count", Some("user-1"), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "not_agent");
    }

    #[tokio::test]
    async fn approve_flow_reaches_calendar() {
        let app = app().await;
        let id = app.create_request().await;

        let (_, body) = app
            .call("GET", "/api/v1/tour-requests/pending-count", Some("agent-1"), None)
            .await;
        assert_eq!(body["data"]["count"], 1);

        let (status, body) = app
            .call(
                "POST",
                &format!("/api/v1/tour-requests/{}/approve", id),
                Some("agent-1"),
                Some(json!({ "response_message": "See you then" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["status"], "approved");
        assert_eq!(body["data"]["agent_response_message"], "See you then");

        let (status, body) = app
            .call("GET", "/api/v1/calendar/events", Some("agent-1"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let event = &body["data"][0];
        assert_eq!(event["id"], id.as_str());
        assert_eq!(event["title"], "Tour: 12 Oak St");
        assert_eq!(event["start"], "2024-06-01T09:00:00");
        assert_eq!(event["end"], "2024-06-01T10:00:00");
        assert_eq!(event["backgroundColor"], "#10b981");
        assert_eq!(event["extendedProps"]["clientName"], "Sam Buyer");
        assert_eq!(event["extendedProps"]["type"], "tour");
    }

    #[tokio::test]
    async fn second_decision_is_409() {
        let app = app().await;
        let id = app.create_request().await;

        let (status, _) = app
            .call(
                "POST",
                &format!("/api/v1/tour-requests/{}/deny", id),
                Some("agent-1"),
                Some(json!({ "reason": "Under offer" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .call(
                "POST",
                &format!("/api/v1/tour-requests/{}/approve", id),
                Some("agent-1"),
                Some(json!({})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "Tour request cannot move from denied to approved"
        );
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let app = app().await;
        let first = app.create_request().await;
        app.create_request().await;
        app.call(
            "POST",
            &format!("/api/v1/tour-requests/{}/cancel", first),
            Some("user-1"),
            None,
        )
        .await;

        let (_, all) = app
            .call("GET", "/api/v1/tour-requests?status=all", Some("agent-1"), None)
            .await;
        assert_eq!(all["data"].as_array().unwrap().len(), 2);

        let (_, cancelled) = app
            .call("GET", "/api/v1/tour-requests?status=cancelled", Some("agent-1"), None)
            .await;
        let rows = cancelled["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], first.as_str());
        assert_eq!(rows[0]["property"]["address"], "12 Oak St");

        let (status, _) = app
            .call("GET", "/api/v1/tour-requests?status=bogus", Some("agent-1"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, stats) = app
            .call("GET", "/api/v1/tour-requests/stats", Some("agent-1"), None)
            .await;
        assert_eq!(stats["data"]["pending"], 1);
        assert_eq!(stats["data"]["cancelled"], 1);
        assert_eq!(stats["data"]["total"], 2);
    }

    #[tokio::test]
    async fn distribution_endpoint_sums_to_100() {
        let app = app().await;
        for _ in 0..3 {
            app.create_request().await;
        }
        let id = app.create_request().await;
        app.call(
            "POST",
            &format!("/api/v1/tour-requests/{}/approve", id),
            Some("agent-1"),
            Some(json!({})),
        )
        .await;

        let (status, body) = app
            .call("GET", "/api/v1/analytics/status-distribution", Some("agent-1"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let shares = body["data"].as_array().unwrap();
        assert_eq!(shares[0]["status"], "Pending");
        assert_eq!(shares[0]["color"], "#f59e0b");
        let sum: f64 = shares.iter().map(|s| s["percentage"].as_f64().unwrap()).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn invalid_body_is_422() {
        let app = app().await;
        let (status, _) = app
            .call(
                "POST",
                "/api/v1/tour-requests",
                Some("user-1"),
                Some(json!({ "property_id": app.property_id, "requested_time_slot": "midnight" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn realtor_search_requires_location() {
        let app = app().await;
        let (status, body) = app
            .call("GET", "/api/v1/realtor/search?query=pool", Some("agent-1"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Location parameter is required");
    }

    #[tokio::test]
    async fn notification_socket_checks_token_before_upgrade() {
        let app = app().await;
        let (status, _) = app.call("GET", "/api/v1/notifications/ws", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let uri = format!("/api/v1/notifications/ws?token={}", app.token("user-1"));
        let (status, body) = app.call("GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "not_agent");
    }

    #[test]
    fn openapi_lists_tour_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/tour-requests/{id}/approve"));
        assert!(doc.paths.paths.contains_key("/api/v1/calendar/events"));
    }
}
