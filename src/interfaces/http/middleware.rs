//! Authentication middleware for Axum
//!
//! Bearer tokens come from the hosted auth provider. The middleware verifies
//! them, looks up the caller's profile and stores an [`AuthenticatedUser`]
//! in the request extensions. Agent-only handlers take [`AgentUser`].

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    NotAgent,
    ProfileLookupFailed,
}

/// Authentication state containing JWT config and the profile store
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub repos: Arc<dyn RepositoryProvider>,
}

/// Caller identity resolved from the bearer token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    /// Profile ID (`sub` claim)
    pub profile_id: String,
    pub email: Option<String>,
    pub is_agent: bool,
}

/// An [`AuthenticatedUser`] whose profile is flagged as agent.
///
/// Rejects with 403 `not_agent` otherwise.
#[derive(Clone, Debug)]
pub struct AgentUser(pub AuthenticatedUser);

impl AgentUser {
    pub fn agent_id(&self) -> &str {
        &self.0.profile_id
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| auth_error_response(AuthError::MissingToken))
    }
}

impl<S> FromRequestParts<S> for AgentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_agent {
            debug!(profile_id = %user.profile_id, "Non-agent on agent route");
            return Err(auth_error_response(AuthError::NotAgent));
        }
        Ok(AgentUser(user))
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verifies `token` and resolves the caller's profile.
///
/// Shared by the HTTP middleware and the WebSocket handshake.
pub async fn authenticate(token: &str, auth: &AuthState) -> Result<AuthenticatedUser, AuthError> {
    let claims: TokenClaims = verify_token(token, &auth.jwt_config).map_err(|e| {
        debug!(error = %e, "Token rejected");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        }
    })?;
    if claims.is_expired() {
        return Err(AuthError::ExpiredToken);
    }

    let profile = auth
        .repos
        .profiles()
        .find_by_id(&claims.sub)
        .await
        .map_err(|e| {
            error!(profile_id = %claims.sub, error = %e, "Profile lookup failed");
            AuthError::ProfileLookupFailed
        })?;

    Ok(AuthenticatedUser {
        is_agent: profile.as_ref().is_some_and(|p| p.is_agent),
        email: claims.email.or_else(|| profile.and_then(|p| p.email)),
        profile_id: claims.sub,
    })
}

/// Bearer token authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| extract_token(h).map(String::from));

    let token = match token {
        None => return auth_error_response(AuthError::MissingToken),
        Some(None) => return auth_error_response(AuthError::InvalidToken),
        Some(Some(token)) => token,
    };

    match authenticate(&token, &auth_state).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

pub fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::NotAgent => (StatusCode::FORBIDDEN, "not_agent"),
        AuthError::ProfileLookupFailed => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile")
        }
    };

    let body = Json(json!({
        "success": false,
        "data": null,
        "error": message
    }));

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Profile;
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::InMemoryRepositoryProvider;

    fn state() -> AuthState {
        AuthState {
            jwt_config: JwtConfig {
                secret: "test".into(),
                audience: None,
                expiration_hours: 1,
            },
            repos: Arc::new(InMemoryRepositoryProvider::new()),
        }
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("Bearer  "), None);
        assert_eq!(extract_token("Basic abc"), None);
    }

    #[tokio::test]
    async fn agent_flag_comes_from_profile() {
        let auth = state();
        auth.repos
            .profiles()
            .save(Profile::new("agent-1", None, true))
            .await
            .unwrap();

        let token = create_token("agent-1", Some("a@example.com"), &auth.jwt_config).unwrap();
        let user = authenticate(&token, &auth).await.unwrap();
        assert!(user.is_agent);
        assert_eq!(user.email.as_deref(), Some("a@example.com"));

        let token = create_token("nobody", None, &auth.jwt_config).unwrap();
        let user = authenticate(&token, &auth).await.unwrap();
        assert!(!user.is_agent);
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let err = authenticate("not-a-jwt", &state()).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }
}
