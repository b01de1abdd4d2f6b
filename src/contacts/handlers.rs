/**
 * Contact HTTP Handlers
 *
 * Routes for the contact handshake and the contact list views. All routes
 * require a bearer token; the mutating routes additionally require the
 * authenticated username to match the `{user}` path segment, so nobody can
 * drive another user's handshake.
 *
 * # Routes
 *
 * - `POST /api/{user}/contacts/requests/send/{contact}` - send a request
 * - `POST /api/{user}/contacts/requests/accept/{contact}` - accept (201 when
 *   the conversation was created, 200 when it already existed)
 * - `POST /api/{user}/contacts/requests/decline/{contact}` - decline
 * - `GET /api/{user}/contacts` - mutual contacts
 * - `GET /api/{user}/contacts/pending-requests` - incoming requests
 * - `GET /api/{user}/contacts/sent-requests` - outgoing requests
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::{ensure_identity, AuthUser};
use crate::server::state::AppState;

/// Response for send/decline.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

/// Response for accept, carrying the conversation the pair now shares.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptResponse {
    pub success: bool,
    pub message: String,
    pub conversation_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    pub contacts: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestsResponse {
    pub contact_requests: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentRequestsResponse {
    pub sent_requests: Vec<String>,
}

pub async fn send_request(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path((user, contact)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, ApiError> {
    ensure_identity(&auth, &user)?;

    state.contacts.send_request(&user, &contact).await?;

    Ok(Json(ActionResponse {
        success: true,
        message: format!("contact request sent to {}", contact),
    }))
}

pub async fn accept_request(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path((user, contact)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_identity(&auth, &user)?;

    let outcome = state.contacts.accept_request(&user, &contact).await?;
    let status = if outcome.was_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(AcceptResponse {
            success: true,
            message: format!("{} added as a contact", contact),
            conversation_id: outcome.conversation().id,
        }),
    ))
}

pub async fn decline_request(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path((user, contact)): Path<(String, String)>,
) -> Result<Json<ActionResponse>, ApiError> {
    ensure_identity(&auth, &user)?;

    state.contacts.decline_request(&user, &contact).await?;

    Ok(Json(ActionResponse {
        success: true,
        message: format!("contact request from {} declined", contact),
    }))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    AuthUser(_auth): AuthUser,
    Path(user): Path<String>,
) -> Result<Json<ContactsResponse>, ApiError> {
    let contacts = state.contacts.contacts_of(&user).await?;
    Ok(Json(ContactsResponse { contacts }))
}

pub async fn list_pending_requests(
    State(state): State<AppState>,
    AuthUser(_auth): AuthUser,
    Path(user): Path<String>,
) -> Result<Json<PendingRequestsResponse>, ApiError> {
    let contact_requests = state.contacts.pending_requests_of(&user).await?;
    Ok(Json(PendingRequestsResponse { contact_requests }))
}

pub async fn list_sent_requests(
    State(state): State<AppState>,
    AuthUser(_auth): AuthUser,
    Path(user): Path<String>,
) -> Result<Json<SentRequestsResponse>, ApiError> {
    let sent_requests = state.contacts.sent_requests_of(&user).await?;
    Ok(Json(SentRequestsResponse { sent_requests }))
}
