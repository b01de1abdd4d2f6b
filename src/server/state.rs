/**
 * Application State Management
 *
 * `AppState` is the central state container, built once at startup and
 * cloned into every handler. It holds the three services (auth, contact
 * workflow, messaging), which in turn hold the injected store and secret
 * provider trait objects. Nothing in here is a global: tests assemble an
 * `AppState` over the in-memory store and a fixed secret.
 *
 * All fields are cheap to clone (`Arc`s all the way down) and safe to share
 * across request tasks.
 */

use std::sync::Arc;

use crate::auth::AuthService;
use crate::contacts::ContactWorkflow;
use crate::messaging::MessagingService;
use crate::secrets::SecretCache;
use crate::server::config::Config;
use crate::store::{ConversationStore, CredentialStore};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub contacts: ContactWorkflow,
    pub messaging: MessagingService,
    pub config: Arc<Config>,
}

impl AppState {
    /// Assemble the services over a pair of stores and a secret cache.
    pub fn new(
        creds: Arc<dyn CredentialStore>,
        conversations: Arc<dyn ConversationStore>,
        secrets: Arc<SecretCache>,
        config: Config,
    ) -> Self {
        Self {
            auth: AuthService::new(creds.clone(), secrets),
            contacts: ContactWorkflow::new(creds, conversations.clone()),
            messaging: MessagingService::new(conversations),
            config: Arc::new(config),
        }
    }
}
