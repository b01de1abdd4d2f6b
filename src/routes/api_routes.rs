/**
 * API Route Handlers
 *
 * This module wires every API endpoint to its handler.
 *
 * # Routes
 *
 * ## Public
 * - `GET /api/health` - liveness probe, never fails
 * - `POST /api/register` - user registration
 * - `POST /api/login` - user login
 *
 * ## Protected (bearer token required)
 * - `PUT /api/message` - append a message and/or mark read
 * - `PUT /api/typing` - typing indicator
 * - `GET /api/conversation/{conversation_id}` - poll a conversation
 * - `POST /api/{user}/contacts/requests/send/{contact}`
 * - `POST /api/{user}/contacts/requests/accept/{contact}`
 * - `POST /api/{user}/contacts/requests/decline/{contact}`
 * - `GET /api/{user}/contacts`
 * - `GET /api/{user}/contacts/pending-requests`
 * - `GET /api/{user}/contacts/sent-requests`
 */

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers::{login, register};
use crate::contacts::handlers as contacts;
use crate::messaging::handlers as messaging;
use crate::middleware::auth::auth_middleware;
use crate::server::state::AppState;

/// Health check: the one endpoint that never fails.
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Configure API routes.
///
/// The protected group carries the auth middleware as a route layer, so a
/// request that matches no protected route falls through to the fallback
/// without being challenged for a token.
pub fn configure_api_routes(router: Router<AppState>, state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // Messaging endpoints
        .route("/api/message", put(messaging::put_message))
        .route("/api/typing", put(messaging::put_typing))
        .route(
            "/api/conversation/{conversation_id}",
            get(messaging::get_conversation),
        )
        // Contact handshake endpoints
        .route(
            "/api/{user}/contacts/requests/send/{contact}",
            post(contacts::send_request),
        )
        .route(
            "/api/{user}/contacts/requests/accept/{contact}",
            post(contacts::accept_request),
        )
        .route(
            "/api/{user}/contacts/requests/decline/{contact}",
            post(contacts::decline_request),
        )
        // Contact list views
        .route("/api/{user}/contacts", get(contacts::list_contacts))
        .route(
            "/api/{user}/contacts/pending-requests",
            get(contacts::list_pending_requests),
        )
        .route(
            "/api/{user}/contacts/sent-requests",
            get(contacts::list_sent_requests),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    router
        // Public endpoints
        .route("/api/health", get(health))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .merge(protected)
}
