/**
 * Server Initialization
 *
 * Builds the Axum application: loads configuration, connects the stores,
 * assembles the application state, and configures the router.
 *
 * # Initialization Process
 *
 * 1. Load configuration from the environment
 * 2. Connect the document stores (PostgreSQL, or in-memory fallback)
 * 3. Build the secret cache over the environment-backed provider
 * 4. Assemble `AppState` and create the router
 *
 * The process is resilient by design: a missing database or signing secret
 * degrades the server (volatile storage, dev secret) instead of preventing
 * startup, with each degradation logged.
 */

use std::sync::Arc;

use axum::Router;

use crate::routes::create_router;
use crate::secrets::{EnvSecretProvider, SecretCache};
use crate::server::config::{load_stores, Config};
use crate::server::state::AppState;

/// Create the Axum application from the environment.
pub async fn create_app() -> Router<()> {
    create_app_with(Config::from_env()).await
}

/// Create the Axum application from an explicit configuration.
pub async fn create_app_with(config: Config) -> Router<()> {
    tracing::info!("Initializing xfchat server");

    let (creds, conversations) = load_stores(&config).await;

    let secrets = Arc::new(SecretCache::new(
        Arc::new(EnvSecretProvider),
        config.secret_cache_ttl,
    ));

    let state = AppState::new(creds, conversations, secrets, config);

    tracing::info!("Router configured");
    create_router(state)
}
