/**
 * Authentication Middleware
 *
 * Protects every route except health/register/login. It extracts the JWT
 * from the Authorization header, verifies it against the current signing
 * secret, and attaches the authenticated username to request extensions for
 * handlers to consume via the `AuthUser` extractor.
 *
 * Returns 401 Unauthorized when the token is missing, malformed, expired,
 * or signed with a different secret.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::server::state::AppState;

/// Authenticated user data extracted from the JWT token.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Authentication middleware.
///
/// 1. Extracts the token from the `Authorization: Bearer <jwt>` header
/// 2. Verifies it against the current signing secret
/// 3. Attaches `AuthenticatedUser` to request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            ApiError::unauthorized("missing bearer token")
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        ApiError::unauthorized("invalid Authorization header format")
    })?;

    let username = state.auth.verify(token).await?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { username });

    Ok(next.run(request).await)
}

/// Identity check for mutating routes: the authenticated user must be the
/// user being acted for.
pub fn ensure_identity(auth: &AuthenticatedUser, user: &str) -> Result<(), ApiError> {
    if auth.username != user {
        tracing::warn!(
            "Identity mismatch: token for '{}' acting as '{}'",
            auth.username,
            user
        );
        return Err(ApiError::forbidden(
            "authenticated user does not match the requested user",
        ));
    }
    Ok(())
}

/// Axum extractor for the authenticated user set by `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                ApiError::unauthorized("missing bearer token")
            })?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_identity_match() {
        let auth = AuthenticatedUser { username: "alice".to_string() };
        assert!(ensure_identity(&auth, "alice").is_ok());
    }

    #[test]
    fn test_ensure_identity_mismatch() {
        let auth = AuthenticatedUser { username: "alice".to_string() };
        match ensure_identity(&auth, "bob") {
            Err(ApiError::Forbidden { .. }) => {}
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }
}
