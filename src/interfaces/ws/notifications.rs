//! WebSocket handler for dashboard notification clients
//!
//! An agent's open dashboard subscribes here and refetches whenever one of
//! its tour requests changes. Browsers cannot set headers on a WebSocket
//! handshake, so the token may come in the `token` query parameter.

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, error, info, warn};

use crate::application::events::SharedEventBus;
use crate::domain::events::EventMessage;
use crate::interfaces::http::middleware::{auth_error_response, authenticate, AuthError, AuthState};

/// Query parameters of the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct NotificationParams {
    /// Bearer token (alternative to the Authorization header)
    pub token: Option<String>,
    /// Comma-separated event types to receive; all when absent
    pub event_types: Option<String>,
}

/// What a single connection gets to see
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub agent_id: String,
    pub event_types: Option<Vec<String>>,
}

impl EventFilter {
    pub fn new(agent_id: impl Into<String>, event_types: Option<&str>) -> Self {
        let event_types = event_types
            .map(|types| {
                types
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|types| !types.is_empty());

        Self {
            agent_id: agent_id.into(),
            event_types,
        }
    }

    pub fn matches(&self, event: &EventMessage) -> bool {
        if event.event.agent_id() != self.agent_id {
            return false;
        }

        match &self.event_types {
            Some(types) => types.iter().any(|t| t == event.event.event_type()),
            None => true,
        }
    }
}

/// State for notification WebSocket handler
#[derive(Clone)]
pub struct NotificationState {
    pub event_bus: SharedEventBus,
    pub auth: AuthState,
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// WebSocket upgrade handler for notifications.
///
/// Authentication happens before the upgrade so failures are plain HTTP
/// 401/403 responses.
pub async fn ws_notifications_handler(
    State(state): State<NotificationState>,
    Query(params): Query<NotificationParams>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let Some(token) = params.token.clone().or_else(|| bearer(&headers)) else {
        return auth_error_response(AuthError::MissingToken);
    };

    let user = match authenticate(&token, &state.auth).await {
        Ok(user) => user,
        Err(e) => return auth_error_response(e),
    };
    if !user.is_agent {
        return auth_error_response(AuthError::NotAgent);
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let filter = EventFilter::new(user.profile_id, params.event_types.as_deref());
    info!(
        agent_id = %filter.agent_id,
        event_types = ?filter.event_types,
        "New notification WebSocket connection"
    );

    ws.on_upgrade(move |socket| handle_notification_socket(socket, state.event_bus, filter))
}

/// Handle a WebSocket connection for notifications
async fn handle_notification_socket(socket: WebSocket, event_bus: SharedEventBus, filter: EventFilter) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriber = event_bus.subscribe();

    let welcome = serde_json::json!({
        "type": "connected",
        "message": "Connected to notification stream",
        "filter": {
            "agent_id": filter.agent_id,
            "event_types": filter.event_types
        }
    });

    if let Err(e) = sender.send(Message::Text(welcome.to_string().into())).await {
        error!(error = %e, "Failed to send welcome message");
        return;
    }

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            error!(error = %e, "Failed to send pong");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!(agent_id = %filter.agent_id, "Client sent close");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                    None => break,
                }
            }

            event = subscriber.recv() => {
                let Some(event_msg) = event else {
                    warn!("Event bus closed");
                    break;
                };
                if !filter.matches(&event_msg) {
                    continue;
                }

                match serde_json::to_string(&event_msg) {
                    Ok(json) => {
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            error!(error = %e, "Failed to send event");
                            break;
                        }
                        debug!(
                            agent_id = %filter.agent_id,
                            event_type = event_msg.event.event_type(),
                            "Event sent to client"
                        );
                    }
                    Err(e) => error!(error = %e, "Failed to serialize event"),
                }
            }
        }
    }

    info!(agent_id = %filter.agent_id, "Notification WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::Event;
    use crate::domain::TourRequest;

    fn message(agent: &str) -> EventMessage {
        let request = TourRequest::new("user-1", "prop-1", agent, None, None, None, None);
        EventMessage::new(Event::created(&request))
    }

    #[test]
    fn only_own_agent_events_pass() {
        let filter = EventFilter::new("agent-1", None);
        assert!(filter.matches(&message("agent-1")));
        assert!(!filter.matches(&message("agent-2")));
    }

    #[test]
    fn event_type_list_narrows_further() {
        let filter = EventFilter::new("agent-1", Some("tour_request_status_changed"));
        assert!(!filter.matches(&message("agent-1")));

        let filter = EventFilter::new("agent-1", Some(" tour_request_created , other "));
        assert!(filter.matches(&message("agent-1")));
    }

    #[test]
    fn blank_event_type_list_means_everything() {
        let filter = EventFilter::new("agent-1", Some(" , "));
        assert!(filter.event_types.is_none());
    }
}
