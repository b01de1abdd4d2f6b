/**
 * Server Configuration
 *
 * Configuration is loaded from environment variables with sensible defaults
 * for local development. A missing or unreachable database does not prevent
 * startup: the server falls back to the in-memory store and logs a warning,
 * so auth and messaging keep working (volatile) while the database is down.
 *
 * # Variables
 *
 * - `SERVER_HOST` / `SERVER_PORT` - bind address (default 0.0.0.0:3001)
 * - `DATABASE_URL` - PostgreSQL connection string; unset means in-memory
 * - `JWT_SECRET` - token signing secret (dev default with a warning)
 * - `SECRET_CACHE_TTL_SECS` - signing-secret cache TTL (default 300)
 * - `STORE_TIMEOUT_MS` - per-operation store timeout (default 5000)
 * - `ALLOWED_ORIGIN` - the single origin allowed cross-origin access
 */

use std::sync::Arc;
use std::time::Duration;

use crate::store::memory::MemoryStore;
use crate::store::postgres::PgStore;
use crate::store::{ConversationStore, CredentialStore};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub allowed_origin: String,
    pub store_timeout: Duration,
    pub secret_cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: None,
            allowed_origin: "https://chat.onrender.com".to_string(),
            store_timeout: Duration::from_millis(5000),
            secret_cache_ttl: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    /// (and logging) on missing or unparseable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Unparseable SERVER_PORT '{}'; using {}", raw, defaults.port);
                defaults.port
            }),
            Err(_) => defaults.port,
        };

        let store_timeout = env_u64("STORE_TIMEOUT_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.store_timeout);
        let secret_cache_ttl = env_u64("SECRET_CACHE_TTL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.secret_cache_ttl);

        Self {
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port,
            database_url: std::env::var("DATABASE_URL").ok(),
            allowed_origin: std::env::var("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
            store_timeout,
            secret_cache_ttl,
        }
    }
}

fn env_u64(var: &str) -> Option<u64> {
    let raw = std::env::var(var).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Unparseable {} '{}'; using default", var, raw);
            None
        }
    }
}

/// Connect the document stores.
///
/// Returns the PostgreSQL store when `DATABASE_URL` is set and reachable;
/// otherwise falls back to the volatile in-memory store so the server still
/// comes up. Errors are logged, never fatal.
pub async fn load_stores(
    config: &Config,
) -> (Arc<dyn CredentialStore>, Arc<dyn ConversationStore>) {
    if let Some(url) = &config.database_url {
        tracing::info!("Connecting to database...");
        match PgStore::connect(url, config.store_timeout).await {
            Ok(store) => {
                tracing::info!("Database connection pool created successfully");
                let store = Arc::new(store);
                return (store.clone(), store);
            }
            Err(e) => {
                tracing::error!("Failed to connect to database: {:?}", e);
                tracing::warn!("Falling back to in-memory store");
            }
        }
    } else {
        tracing::warn!("DATABASE_URL not set; using volatile in-memory store");
    }

    let store = Arc::new(MemoryStore::new());
    (store.clone(), store)
}
