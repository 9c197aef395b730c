/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/auth/signup.
 *
 * # Registration Process
 *
 * 1. Validate email, password length and display name
 * 2. Check if the email is already registered
 * 3. Hash password using bcrypt
 * 4. Store the user
 * 5. Generate JWT token
 *
 * # Validation
 *
 * - Email must contain '@' character (basic validation)
 * - Password must be at least 6 characters long
 * - Display name must not be blank
 */

use std::sync::Arc;

use axum::{extract::State, response::Json};
use bcrypt::hash;

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{create_user, get_user_by_email};
use crate::backend::error::BackendError;
use crate::backend::server::config::ServerConfig;
use crate::backend::store::{Datastore, StoreError};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Sign up handler
///
/// # Errors
///
/// * `400 Bad Request` - invalid email, short password or blank display name
/// * `409 Conflict` - the email is already registered
/// * `500 Internal Server Error` - hashing, storage or token generation failed
///
/// # Example Request
///
/// ```http
/// POST /api/auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret123",
///   "displayName": "User"
/// }
/// ```
pub async fn signup(
    State(store): State<Arc<dyn Datastore>>,
    State(config): State<Arc<ServerConfig>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    tracing::info!("Signup request for email: {}", request.email);

    if !request.email.contains('@') {
        tracing::warn!("Invalid email format: {}", request.email);
        return Err(BackendError::validation("Invalid email format"));
    }

    if request.password.len() < MIN_PASSWORD_LEN {
        tracing::warn!("Password too short");
        return Err(BackendError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        return Err(BackendError::validation("Display name is required"));
    }

    if get_user_by_email(store.as_ref(), &request.email).await?.is_some() {
        tracing::warn!("Email already exists: {}", request.email);
        return Err(BackendError::conflict("Email already registered"));
    }

    let password_hash = hash(&request.password, config.bcrypt_cost).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::internal("Server error")
    })?;

    let user = create_user(store.as_ref(), &request.email, display_name, password_hash)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => BackendError::conflict("Email already registered"),
            other => BackendError::from(other),
        })?;

    let token = create_token(user.id, &user.email, &config.jwt_secret).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::internal("Server error")
    })?;

    tracing::info!("User created successfully: {}", user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
