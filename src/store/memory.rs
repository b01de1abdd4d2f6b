//! In-Memory Store
//!
//! Mutex-guarded maps implementing both store traits. Used as the test
//! double and as the degraded mode when no `DATABASE_URL` is configured:
//! the server stays fully functional but nothing survives a restart.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Conversation, UserRecord};
use crate::error::ApiError;
use crate::store::{
    ConversationStore, ConversationUpdate, CredentialStore, PairUpdate, StoreError,
};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, UserRecord>>,
    conversations: Mutex<HashMap<Uuid, Conversation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> std::sync::MutexGuard<'_, HashMap<String, UserRecord>> {
        // A poisoned lock means a panic mid-mutation; propagating the panic
        // is the only sound option for an in-process map.
        self.users.lock().expect("user map lock poisoned")
    }

    fn conversations(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Conversation>> {
        self.conversations.lock().expect("conversation map lock poisoned")
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users().get(username).cloned())
    }

    async fn create(&self, username: &str, record: &UserRecord) -> Result<bool, StoreError> {
        let mut users = self.users();
        if users.contains_key(username) {
            return Ok(false);
        }
        users.insert(username.to_string(), record.clone());
        Ok(true)
    }

    async fn update_pair(&self, a: &str, b: &str, apply: PairUpdate) -> Result<(), ApiError> {
        let mut users = self.users();
        let mut doc_a = users.get(a).cloned();
        let mut doc_b = users.get(b).cloned();

        apply(&mut doc_a, &mut doc_b)?;

        match doc_a {
            Some(doc) => {
                users.insert(a.to_string(), doc);
            }
            None => {
                users.remove(a);
            }
        }
        match doc_b {
            Some(doc) => {
                users.insert(b.to_string(), doc);
            }
            None => {
                users.remove(b);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        Ok(self.conversations().get(&id).cloned())
    }

    async fn find_by_participants(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<Conversation>, StoreError> {
        Ok(self
            .conversations()
            .values()
            .find(|convo| convo.has_participant(a) && convo.has_participant(b))
            .cloned())
    }

    async fn create(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.conversations()
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        apply: ConversationUpdate,
    ) -> Result<Conversation, ApiError> {
        let mut conversations = self.conversations();
        let mut updated = conversations
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("conversation not found"))?;

        // Mutate a copy so a closure error leaves the stored document
        // untouched, matching the transactional behavior of the SQL store.
        apply(&mut updated)?;
        conversations.insert(id, updated.clone());
        Ok(updated)
    }
}
