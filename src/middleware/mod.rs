//! Middleware Module
//!
//! Request-processing middleware for the HTTP server.

/// Bearer-token authentication middleware and extractor
pub mod auth;

pub use auth::{auth_middleware, ensure_identity, AuthUser, AuthenticatedUser};
