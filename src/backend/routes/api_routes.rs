/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Health
 * - `GET /health` - Liveness check
 *
 * ## Authentication
 * - `POST /api/auth/signup` - User registration
 * - `POST /api/auth/login` - User login
 * - `GET /api/auth/me` - Get current user info
 */

use axum::{response::Json, routing::get, routing::post, Router};
use serde_json::{json, Value};

use crate::backend::auth::{get_me, login, signup};
use crate::backend::server::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Configure health and authentication routes
///
/// `/api/auth/me` requires a JWT in the `Authorization` header; the other
/// routes are public.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/health", get(health))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(get_me))
}
