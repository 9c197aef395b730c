/**
 * Application State Management
 *
 * `AppState` is the router state. The `FromRef` implementations let handlers
 * extract just the part they need, e.g. `State(store): State<Arc<dyn Datastore>>`.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::server::config::ServerConfig;
use crate::backend::store::Datastore;

/// Shared state of every request handler
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (PostgreSQL or in-memory)
    pub store: Arc<dyn Datastore>,

    /// Resolved server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Datastore>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<dyn Datastore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
