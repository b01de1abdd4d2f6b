//! Contact Workflow Module
//!
//! The contact-request handshake: send, accept, decline, and the lazy
//! creation of the conversation between two users who become contacts.
//! This is the core of the system: every operation touches two user
//! documents and sometimes a conversation document.

/// HTTP handlers for the contact endpoints
pub mod handlers;

/// The send/accept/decline workflow
pub mod workflow;

pub use workflow::{ContactWorkflow, EnsureOutcome};
