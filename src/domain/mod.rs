//! Persisted Document Types
//!
//! These are the documents the stores read and write: one `UserRecord` per
//! username and one `Conversation` per conversation id. Field names serialize
//! in camelCase to match the wire format the clients speak.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user document, keyed by username.
///
/// The contact sets are genuine set containers: duplicate entries are
/// structurally impossible, and they serialize as sorted arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    /// bcrypt hash supplied at registration; never returned to clients
    pub hashed_password: String,
    /// Mutual contacts of this user
    pub contacts: BTreeSet<String>,
    /// Usernames with a pending request TO this user (incoming)
    pub contact_requests: BTreeSet<String>,
    /// Usernames this user has a pending request FOR (outgoing)
    pub sent_requests: BTreeSet<String>,
}

impl UserRecord {
    /// A fresh record holding only the registration-supplied hash.
    pub fn with_password(hashed_password: impl Into<String>) -> Self {
        Self {
            hashed_password: hashed_password.into(),
            ..Self::default()
        }
    }
}

/// A conversation document, keyed by a generated UUID.
///
/// Exactly two participants, stored as a username→true map so the store can
/// query by membership. Messages are append-only from the API's perspective;
/// the typing map is last-writer-wins per user and never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub participants: BTreeMap<String, bool>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub typing: BTreeMap<String, bool>,
}

impl Conversation {
    /// Create an empty conversation between two users.
    pub fn between(a: &str, b: &str) -> Self {
        let mut participants = BTreeMap::new();
        participants.insert(a.to_string(), true);
        participants.insert(b.to_string(), true);
        Self {
            id: Uuid::new_v4(),
            participants,
            messages: Vec::new(),
            typing: BTreeMap::new(),
        }
    }

    /// Whether `user` is one of the two participants.
    pub fn has_participant(&self, user: &str) -> bool {
        self.participants.get(user).copied().unwrap_or(false)
    }

    /// Timestamp of the latest message, if any.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.iter().map(|m| m.timestamp).max()
    }
}

/// A single chat message inside a conversation document.
///
/// `sender` and `timestamp` are immutable once written; `readBy` only ever
/// gains entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub sender: String,
    pub body: String,
    /// Server-assigned at write time
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read_by: BTreeMap<String, bool>,
}
