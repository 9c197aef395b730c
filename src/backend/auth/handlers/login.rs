/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Security
 *
 * - Passwords are verified using bcrypt
 * - Unknown email and wrong password both return 401 "Invalid credentials"
 * - User passwords are never returned in responses
 */

use std::sync::Arc;

use axum::{extract::State, response::Json};
use bcrypt::verify;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::BackendError;
use crate::backend::server::config::ServerConfig;
use crate::backend::store::Datastore;

fn invalid_credentials() -> BackendError {
    BackendError::authentication_required("Invalid credentials")
}

/// Login handler
///
/// # Errors
///
/// * `401 Unauthorized` - If user is not found or password is incorrect
/// * `500 Internal Server Error` - If the store or token generation fails
pub async fn login(
    State(store): State<Arc<dyn Datastore>>,
    State(config): State<Arc<ServerConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    tracing::info!("Login request for: {}", request.email);

    let user = get_user_by_email(store.as_ref(), &request.email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", request.email);
            invalid_credentials()
        })?;

    let valid = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification error: {:?}", e);
        BackendError::internal("Server error")
    })?;

    if !valid {
        tracing::warn!("Invalid password for user: {}", request.email);
        return Err(invalid_credentials());
    }

    let token = create_token(user.id, &user.email, &config.jwt_secret).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::internal("Server error")
    })?;

    tracing::info!("User logged in successfully: {}", user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
