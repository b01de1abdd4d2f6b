/**
 * Messaging Service
 *
 * Appends messages, rewrites read-receipts, and flips typing flags on a
 * conversation document. Every operation is a transactional update of the
 * whole document, so concurrent sends interleave instead of losing writes.
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Conversation, Message};
use crate::error::ApiError;
use crate::store::ConversationStore;

#[derive(Clone)]
pub struct MessagingService {
    conversations: Arc<dyn ConversationStore>,
}

impl MessagingService {
    pub fn new(conversations: Arc<dyn ConversationStore>) -> Self {
        Self { conversations }
    }

    /// Append a message and return it as stored.
    ///
    /// The timestamp is assigned here, clamped to never run behind the
    /// latest message already in the conversation, which keeps timestamps
    /// non-decreasing even if the wall clock steps backwards.
    ///
    /// # Errors
    ///
    /// * `NotFound` - no such conversation
    /// * `Unauthorized` - sender is not a participant
    pub async fn send_message(
        &self,
        conversation_id: Uuid,
        sender: &str,
        body: &str,
    ) -> Result<Message, ApiError> {
        let sender = sender.to_string();
        let body = body.to_string();

        let updated = self
            .conversations
            .update(
                conversation_id,
                Box::new(move |convo| {
                    if !convo.has_participant(&sender) {
                        return Err(ApiError::unauthorized(
                            "sender is not a participant in this conversation",
                        ));
                    }

                    let mut timestamp = Utc::now();
                    if let Some(last) = convo.last_timestamp() {
                        timestamp = timestamp.max(last);
                    }

                    convo.messages.push(Message {
                        sender,
                        body,
                        timestamp,
                        read_by: BTreeMap::new(),
                    });
                    Ok(())
                }),
            )
            .await?;

        updated
            .messages
            .last()
            .cloned()
            .ok_or_else(|| ApiError::internal("message append produced an empty conversation"))
    }

    /// Mark every message in the conversation as read by `reader`,
    /// including the reader's own messages. A full-array rewrite, so the
    /// cost is O(message count); calling it twice is a no-op the second
    /// time.
    pub async fn mark_read(&self, conversation_id: Uuid, reader: &str) -> Result<(), ApiError> {
        let reader = reader.to_string();

        self.conversations
            .update(
                conversation_id,
                Box::new(move |convo| {
                    for message in &mut convo.messages {
                        message.read_by.insert(reader.clone(), true);
                    }
                    Ok(())
                }),
            )
            .await?;
        Ok(())
    }

    /// Set `user`'s typing flag. Last write wins; there is no expiry, so a
    /// client that crashes mid-type leaves a stale `true` until it writes
    /// again.
    pub async fn set_typing(
        &self,
        conversation_id: Uuid,
        user: &str,
        typing: bool,
    ) -> Result<(), ApiError> {
        let user = user.to_string();

        self.conversations
            .update(
                conversation_id,
                Box::new(move |convo| {
                    convo.typing.insert(user, typing);
                    Ok(())
                }),
            )
            .await?;
        Ok(())
    }

    /// Fetch a conversation for polling. Only participants may read it.
    pub async fn conversation(
        &self,
        conversation_id: Uuid,
        requester: &str,
    ) -> Result<Conversation, ApiError> {
        let convo = self
            .conversations
            .get(conversation_id)
            .await?
            .ok_or_else(|| ApiError::not_found("conversation not found"))?;

        if !convo.has_participant(requester) {
            return Err(ApiError::forbidden(
                "not a participant in this conversation",
            ));
        }
        Ok(convo)
    }
}
