/**
 * Get Current User Handler
 *
 * GET /api/auth/me returns the account behind the bearer token together
 * with the forms it owns.
 */

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::MeResponse;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::catalog::service::list_forms;
use crate::backend::error::BackendError;
use crate::backend::middleware::Caller;
use crate::backend::store::Datastore;
use crate::shared::FormsFilter;

/// Get current user handler
///
/// # Errors
///
/// * `401 Unauthorized` - no token, or an invalid one
/// * `404 Not Found` - the token names a user that no longer exists
pub async fn get_me(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
) -> Result<Json<MeResponse>, BackendError> {
    let user_id = caller.require()?;

    let user = get_user_by_id(store.as_ref(), user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", user_id);
            BackendError::not_found("user not found")
        })?;

    let filter = FormsFilter {
        owner_id: Some(user_id),
        access: None,
    };
    let forms = list_forms(store.as_ref(), &filter).await?;

    Ok(Json(MeResponse {
        user: user.into(),
        forms,
    }))
}
