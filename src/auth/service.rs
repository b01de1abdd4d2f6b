/**
 * Auth Service
 *
 * Registration, login, and token verification against the credential store.
 * The signing secret is fetched through the process-wide secret cache on
 * each operation, so a rotated secret takes effect when the cache expires.
 */

use std::sync::Arc;

use crate::auth::sessions;
use crate::domain::UserRecord;
use crate::error::ApiError;
use crate::secrets::{SecretCache, JWT_SECRET_NAME};
use crate::store::CredentialStore;

#[derive(Clone)]
pub struct AuthService {
    creds: Arc<dyn CredentialStore>,
    secrets: Arc<SecretCache>,
}

/// Validate username format.
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl AuthService {
    pub fn new(creds: Arc<dyn CredentialStore>, secrets: Arc<SecretCache>) -> Self {
        Self { creds, secrets }
    }

    /// Register a new user with a client-supplied bcrypt hash and return a
    /// signed token. Fails `Conflict` when the username is taken.
    pub async fn register(&self, username: &str, hashed_password: &str) -> Result<String, ApiError> {
        if !is_valid_username(username) {
            return Err(ApiError::bad_request(
                "username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
            ));
        }
        if hashed_password.is_empty() {
            return Err(ApiError::bad_request("hashedPassword must not be empty"));
        }

        let record = UserRecord::with_password(hashed_password);
        let created = self.creds.create(username, &record).await?;
        if !created {
            tracing::warn!("Username already exists: {}", username);
            return Err(ApiError::conflict("username already taken"));
        }

        tracing::info!("User registered: {}", username);
        self.issue_token(username).await
    }

    /// Verify a plaintext password against the stored hash and return a
    /// signed token. Fails `NotFound` for unknown users and `Unauthorized`
    /// on mismatch.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let user = self
            .creds
            .get(username)
            .await?
            .ok_or_else(|| ApiError::not_found("no such user"))?;

        // A record created lazily by the accept endpoint has no usable hash;
        // treat that the same as a wrong password.
        let valid = bcrypt::verify(password, &user.hashed_password).unwrap_or(false);
        if !valid {
            tracing::warn!("Invalid password for user: {}", username);
            return Err(ApiError::unauthorized("invalid credentials"));
        }

        tracing::info!("User logged in: {}", username);
        self.issue_token(username).await
    }

    /// Verify a bearer token and return the username it was issued for.
    pub async fn verify(&self, token: &str) -> Result<String, ApiError> {
        let secret = self.secrets.get(JWT_SECRET_NAME).await?;
        let claims = sessions::verify_token(&secret, token).map_err(|e| {
            tracing::warn!("Invalid token: {:?}", e);
            ApiError::unauthorized("invalid or expired token")
        })?;
        Ok(claims.sub)
    }

    async fn issue_token(&self, username: &str) -> Result<String, ApiError> {
        let secret = self.secrets.get(JWT_SECRET_NAME).await?;
        sessions::create_token(&secret, username)
            .map_err(|e| ApiError::internal(format!("failed to create token: {}", e)))
    }
}
