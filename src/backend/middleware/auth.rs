/**
 * Caller Identity
 *
 * Every request is resolved to a `Caller` from its `Authorization` header:
 *
 * - no header: `Caller::Anonymous`
 * - `Bearer <jwt>` naming an existing user: `Caller::User(id)`
 * - anything else: 401
 *
 * Services receive the `Caller` explicitly and decide for themselves whether
 * an anonymous caller is acceptable.
 */

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Who is making a request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(Uuid),
}

impl Caller {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(*id),
        }
    }

    /// The caller's user id, or "authorization required"
    pub fn require(&self) -> Result<Uuid, BackendError> {
        self.user_id()
            .ok_or_else(|| BackendError::authentication_required("authorization required"))
    }

    pub fn is(&self, user_id: Uuid) -> bool {
        self.user_id() == Some(user_id)
    }
}

fn invalid_token() -> BackendError {
    BackendError::authentication_required("invalid token")
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller::Anonymous);
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                tracing::warn!("Invalid Authorization header format");
                invalid_token()
            })?;

        let claims = verify_token(token.trim(), &state.config.jwt_secret).map_err(|e| {
            tracing::warn!("Invalid token: {:?}", e);
            invalid_token()
        })?;

        let user_id = claims.user_id().ok_or_else(|| {
            tracing::warn!("Invalid user ID in token: {}", claims.sub);
            invalid_token()
        })?;

        if get_user_by_id(state.store.as_ref(), user_id).await?.is_none() {
            tracing::warn!("Token for unknown user: {}", user_id);
            return Err(invalid_token());
        }

        Ok(Caller::User(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::sessions::create_token;
    use crate::backend::auth::users::create_user;
    use crate::backend::server::config::ServerConfig;
    use crate::backend::store::MemoryStore;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("http://example.com");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn app_state(store: MemoryStore) -> AppState {
        AppState::new(Arc::new(store), ServerConfig::for_tests())
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        let state = app_state(MemoryStore::new());
        let mut parts = parts_with(None);
        let caller = Caller::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(caller, Caller::Anonymous);
        assert!(caller.require().is_err());
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let store = MemoryStore::new();
        let user = create_user(&store, "caller@example.com", "Caller", "hash".to_string())
            .await
            .unwrap();
        let state = app_state(store);
        let token = create_token(user.id, &user.email, &state.config.jwt_secret).unwrap();

        let mut parts = parts_with(Some(&format!("Bearer {}", token)));
        let caller = Caller::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(caller, Caller::User(user.id));
        assert!(caller.is(user.id));
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let state = app_state(MemoryStore::new());
        let mut parts = parts_with(Some("Bearer not.a.token"));
        let err = Caller::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_is_rejected() {
        let state = app_state(MemoryStore::new());
        let token = create_token(Uuid::new_v4(), "ghost@example.com", &state.config.jwt_secret).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {}", token)));
        let err = Caller::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
