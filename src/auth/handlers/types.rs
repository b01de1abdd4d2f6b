//! Authentication Request/Response Types
//!
//! Request bodies are validated at the boundary: unknown fields are
//! rejected, so a client typo fails loudly instead of silently no-opping.

use serde::{Deserialize, Serialize};

/// Body of POST /api/register. The client hashes the password with bcrypt
/// and sends the hash; the server never sees the plaintext at registration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user: String,
    pub hashed_password: String,
}

/// Body of POST /api/login. Login sends the plaintext, verified against the
/// stored hash.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub user: String,
    pub password: String,
}

/// Response for both register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}
