//! Signing-Secret Provider
//!
//! The token-signing secret comes from an external provider addressed by
//! logical name. The default provider maps logical names onto environment
//! variables (which is how the deployment injects secrets); a fixed-value
//! provider exists for tests. A process-wide TTL cache sits in front of
//! whichever provider is configured so the secret is not refetched on every
//! request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ApiError;

/// Logical name of the JWT signing secret.
pub const JWT_SECRET_NAME: &str = "jwt-signing-secret";

/// Source of secrets by logical name.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<String, ApiError>;
}

/// Resolves logical secret names to environment variables.
pub struct EnvSecretProvider;

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn fetch(&self, name: &str) -> Result<String, ApiError> {
        let var = match name {
            JWT_SECRET_NAME => "JWT_SECRET",
            other => {
                return Err(ApiError::internal(format!("unknown secret name: {}", other)));
            }
        };

        match std::env::var(var) {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!("Missing {}; using development default", var);
                Ok("dev-secret-change-in-production".to_string())
            }
        }
    }
}

/// Always returns the same value; for tests.
pub struct FixedSecretProvider(pub String);

impl FixedSecretProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }
}

#[async_trait]
impl SecretProvider for FixedSecretProvider {
    async fn fetch(&self, _name: &str) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}

struct CachedSecret {
    value: String,
    fetched_at: Instant,
}

/// TTL cache in front of a `SecretProvider`. Entries older than the TTL are
/// refetched on the next lookup; there is no background refresh.
pub struct SecretCache {
    provider: Arc<dyn SecretProvider>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedSecret>>,
}

impl SecretCache {
    pub fn new(provider: Arc<dyn SecretProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, name: &str) -> Result<String, ApiError> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(name) {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(entry.value.clone());
                }
            }
        }

        let value = self.provider.fetch(name).await?;
        let mut entries = self.entries.write().await;
        entries.insert(
            name.to_string(),
            CachedSecret {
                value: value.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(value)
    }
}
