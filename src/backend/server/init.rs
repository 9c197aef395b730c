/**
 * Server Initialization
 *
 * Builds the application router:
 *
 * 1. Select the datastore (PostgreSQL or in-memory)
 * 2. Create the shared `AppState`
 * 3. Configure routes and middleware
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_store, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::Datastore;

/// Create and configure the Axum application
///
/// A missing or unreachable database does not prevent startup; the server
/// runs on the in-memory store instead.
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("Initializing formhub backend server");

    let store = load_store(&config).await;
    create_app_with_store(store, config)
}

/// Create the application over an already constructed datastore
pub fn create_app_with_store(store: Arc<dyn Datastore>, config: ServerConfig) -> Router<()> {
    let app_state = AppState::new(store, config);
    let app = create_router(app_state);

    tracing::info!("Router configured");
    app
}
