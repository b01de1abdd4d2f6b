//! Document Stores
//!
//! The credential and conversation stores wrap the `users` and
//! `conversations` collections of the document database. Both are trait
//! objects injected at startup, so handlers never touch a global connection
//! and tests can run against the in-memory implementation.
//!
//! Multi-field updates go through `update_pair` / `update`, which load the
//! affected documents, apply a fallible closure, and persist the result as
//! one atomic step. A closure error aborts the write and propagates to the
//! caller, which is how the contact workflow reports `NotFound`/`Conflict`
//! without leaving half-updated documents behind.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Conversation, UserRecord};
use crate::error::ApiError;

/// Failures below the API layer: the database itself, document corruption,
/// or the bounded per-operation timeout expiring.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("corrupt document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => ApiError::unavailable("store operation timed out"),
            other => ApiError::internal(other),
        }
    }
}

/// Fallible mutation applied to a pair of user documents. Either side is
/// `None` when no document exists for that username; the closure may insert
/// one by setting the option.
pub type PairUpdate =
    Box<dyn FnOnce(&mut Option<UserRecord>, &mut Option<UserRecord>) -> Result<(), ApiError> + Send>;

/// Fallible mutation applied to a single conversation document.
pub type ConversationUpdate = Box<dyn FnOnce(&mut Conversation) -> Result<(), ApiError> + Send>;

/// The `users` collection: one document per username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a user document.
    async fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a document if the username is free. Returns `false` when the
    /// username is already taken.
    async fn create(&self, username: &str, record: &UserRecord) -> Result<bool, StoreError>;

    /// Load both documents, apply `apply`, and persist the result
    /// atomically. Callers guarantee `a != b`. The closure receives the
    /// documents in the order the usernames were passed.
    async fn update_pair(&self, a: &str, b: &str, apply: PairUpdate) -> Result<(), ApiError>;
}

/// The `conversations` collection: one document per conversation id.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Fetch a conversation document.
    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, StoreError>;

    /// Find the conversation whose participants map contains both usernames.
    async fn find_by_participants(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Insert a new conversation document.
    async fn create(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Load the document, apply `apply`, persist atomically, and return the
    /// updated document. Fails `NotFound` when the conversation is absent.
    async fn update(&self, id: Uuid, apply: ConversationUpdate) -> Result<Conversation, ApiError>;
}
