/**
 * API Error Types
 *
 * This module defines the error taxonomy used across the server. Every
 * handler and service returns `ApiError`; the single conversion point in
 * `conversion.rs` turns it into an HTTP response.
 *
 * # Error Categories
 *
 * - `BadRequest` - malformed or self-referential input (400)
 * - `Unauthorized` - missing/invalid token or bad credentials (401)
 * - `Forbidden` - authenticated identity does not match the acted-on user (403)
 * - `NotFound` - missing user or conversation (404)
 * - `Conflict` - duplicate registration or duplicate pending request (409)
 * - `Unavailable` - store timed out or is unreachable (503)
 * - `Internal` - any other store/secret/serialization failure (500); the
 *   cause is logged, never sent to the client
 */

use axum::http::StatusCode;
use thiserror::Error;

/// Server-wide error type, one variant per user-visible failure class.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    Unavailable { message: String },

    /// Internal failure; `cause` is logged at the conversion boundary and the
    /// client only ever sees a generic message.
    #[error("internal server error")]
    Internal { cause: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }

    pub fn internal(cause: impl std::fmt::Display) -> Self {
        Self::Internal { cause: cause.to_string() }
    }

    /// The HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client. Internal causes are replaced by a
    /// generic message; everything else passes through.
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal { .. } => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}
