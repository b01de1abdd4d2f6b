/**
 * Register Handler
 *
 * POST /api/register: create a user and return a token for immediate use.
 *
 * # Errors
 *
 * * `400 Bad Request` - invalid username or empty hash
 * * `409 Conflict` - username already taken
 * * `500 Internal Server Error` - store or token failure
 */

use axum::{extract::State, response::Json};

use crate::auth::handlers::types::{AuthResponse, RegisterRequest};
use crate::error::ApiError;
use crate::server::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    tracing::info!("Register request for user: {}", request.user);

    let token = state
        .auth
        .register(&request.user, &request.hashed_password)
        .await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "user registered".to_string(),
        token,
    }))
}
