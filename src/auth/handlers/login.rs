/**
 * Login Handler
 *
 * POST /api/login: verify credentials and return a token.
 *
 * # Errors
 *
 * * `404 Not Found` - no such user
 * * `401 Unauthorized` - wrong password
 * * `500 Internal Server Error` - store or token failure
 */

use axum::{extract::State, response::Json};

use crate::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::error::ApiError;
use crate::server::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    tracing::info!("Login request for user: {}", request.user);

    let token = state.auth.login(&request.user, &request.password).await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "login successful".to_string(),
        token,
    }))
}
