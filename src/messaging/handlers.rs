/**
 * Messaging HTTP Handlers
 *
 * - `PUT /api/message` - append a message and/or mark the conversation read
 * - `PUT /api/typing` - set the caller's typing flag
 * - `GET /api/conversation/{conversation_id}` - fetch a conversation for polling
 *
 * A single PUT /api/message can do both things: carry a `message` to append
 * and set `updateRead` so everything (including the new message) is marked
 * read by the caller in the same request.
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Conversation, Message};
use crate::error::ApiError;
use crate::middleware::auth::{ensure_identity, AuthUser};
use crate::server::state::AppState;

/// Body of PUT /api/message.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MessagePutRequest {
    pub conversation_id: Uuid,
    /// Message to append, if any
    #[serde(default)]
    pub message: Option<MessageBody>,
    /// Mark every message read by the authenticated user
    #[serde(default)]
    pub update_read: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageBody {
    pub sender: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct MessagePutResponse {
    pub success: bool,
    /// The stored message when one was appended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// Body of PUT /api/typing.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TypingPutRequest {
    pub conversation_id: Uuid,
    pub user: String,
    pub typing: bool,
}

#[derive(Debug, Serialize)]
pub struct TypingPutResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub success: bool,
    pub conversation: Conversation,
}

pub async fn put_message(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<MessagePutRequest>,
) -> Result<Json<MessagePutResponse>, ApiError> {
    let update_read = request.update_read.unwrap_or(false);
    if request.message.is_none() && !update_read {
        return Err(ApiError::bad_request(
            "nothing to do: provide message, updateRead, or both",
        ));
    }

    let mut stored = None;
    if let Some(body) = request.message {
        // Only the authenticated user may appear as the sender
        ensure_identity(&auth, &body.sender)?;
        stored = Some(
            state
                .messaging
                .send_message(request.conversation_id, &body.sender, &body.body)
                .await?,
        );
    }

    if update_read {
        state
            .messaging
            .mark_read(request.conversation_id, &auth.username)
            .await?;
    }

    Ok(Json(MessagePutResponse {
        success: true,
        message: stored,
    }))
}

pub async fn put_typing(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<TypingPutRequest>,
) -> Result<Json<TypingPutResponse>, ApiError> {
    ensure_identity(&auth, &request.user)?;

    state
        .messaging
        .set_typing(request.conversation_id, &request.user, request.typing)
        .await?;

    Ok(Json(TypingPutResponse { success: true }))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let conversation = state
        .messaging
        .conversation(conversation_id, &auth.username)
        .await?;

    Ok(Json(ConversationResponse {
        success: true,
        conversation,
    }))
}
