//! XFChat - Two-Party Chat Backend
//!
//! XFChat is a REST backend for a two-party chat application: user
//! registration/login, the contact-request handshake, conversation creation,
//! and message exchange with read-receipts and typing indicators, persisted
//! as JSON documents in PostgreSQL.
//!
//! # Module Structure
//!
//! - **`domain`** - The persisted document types (user records, conversations, messages)
//! - **`store`** - Credential and conversation store traits plus the PostgreSQL and in-memory implementations
//! - **`secrets`** - Token-signing secret provider with a process-wide TTL cache
//! - **`auth`** - Registration, login, JWT issuing and verification
//! - **`contacts`** - The contact-request send/accept/decline workflow (the core of the system)
//! - **`messaging`** - Message append, read-receipts, typing indicators
//! - **`middleware`** - Bearer-token authentication middleware
//! - **`routes`** - Router assembly and API route configuration
//! - **`server`** - Configuration, application state, server initialization
//! - **`error`** - The API error taxonomy and its HTTP conversion
//!
//! # Authentication Flow
//!
//! 1. **Register**: client supplies a username and a bcrypt hash → user document created → JWT returned
//! 2. **Login**: client supplies username and password → hash verified → JWT returned
//! 3. All other endpoints require `Authorization: Bearer <jwt>`; mutating
//!    endpoints additionally require the authenticated username to match the
//!    user named in the request.

/// Persisted document types
pub mod domain;

/// API error taxonomy and HTTP conversion
pub mod error;

/// Document store traits and implementations
pub mod store;

/// Signing-secret provider and cache
pub mod secrets;

/// Authentication, JWT tokens, user registration
pub mod auth;

/// Contact-request workflow and conversation creation
pub mod contacts;

/// Message exchange, read-receipts, typing indicators
pub mod messaging;

/// Request-processing middleware
pub mod middleware;

/// Route configuration
pub mod routes;

/// Server setup and configuration
pub mod server;

// Re-export commonly used types
pub use error::ApiError;
pub use server::state::AppState;
