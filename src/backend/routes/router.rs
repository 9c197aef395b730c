/**
 * Router Configuration
 *
 * Combines all route configurations into a single Axum router.
 *
 * `TraceLayer` logs every request and response through `tracing`.
 * `CatchPanicLayer` turns a panicking handler into the generic 500 JSON body.
 */

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::backend::error::{not_found_fallback, panic_response};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::form_routes::configure_form_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state holding the datastore and configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new();

    let router = configure_api_routes(router);
    let router = configure_form_routes(router);

    router
        .fallback(not_found_fallback)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::backend::auth::users::User;
    use crate::backend::server::config::ServerConfig;
    use crate::backend::store::{
        AnswerRow, Datastore, FormRow, MemoryStore, OptionRow, QuestionRow, ResponseRow,
        StoreResult, StoreTx,
    };
    use crate::shared::FormsFilter;

    /// A datastore whose every call panics
    struct BrokenStore;

    #[async_trait]
    impl Datastore for BrokenStore {
        async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
            panic!("store unavailable")
        }
        async fn insert_user(&self, _: &User) -> StoreResult<()> {
            panic!("store unavailable")
        }
        async fn find_user_by_email(&self, _: &str) -> StoreResult<Option<User>> {
            panic!("store unavailable")
        }
        async fn find_user_by_id(&self, _: Uuid) -> StoreResult<Option<User>> {
            panic!("store unavailable")
        }
        async fn find_form(&self, _: Uuid) -> StoreResult<Option<FormRow>> {
            panic!("store unavailable")
        }
        async fn list_forms(&self, _: &FormsFilter) -> StoreResult<Vec<FormRow>> {
            panic!("store unavailable")
        }
        async fn questions_for_forms(&self, _: &[Uuid]) -> StoreResult<Vec<QuestionRow>> {
            panic!("store unavailable")
        }
        async fn questions_by_ids(&self, _: &[Uuid]) -> StoreResult<Vec<QuestionRow>> {
            panic!("store unavailable")
        }
        async fn options_for_questions(&self, _: &[Uuid]) -> StoreResult<Vec<OptionRow>> {
            panic!("store unavailable")
        }
        async fn find_option(&self, _: Uuid) -> StoreResult<Option<OptionRow>> {
            panic!("store unavailable")
        }
        async fn find_response(&self, _: Uuid) -> StoreResult<Option<ResponseRow>> {
            panic!("store unavailable")
        }
        async fn responses_for_form(&self, _: Uuid) -> StoreResult<Vec<ResponseRow>> {
            panic!("store unavailable")
        }
        async fn answers_for_responses(&self, _: &[Uuid]) -> StoreResult<Vec<AnswerRow>> {
            panic!("store unavailable")
        }
        async fn selected_options(&self, _: &[Uuid]) -> StoreResult<Vec<(Uuid, OptionRow)>> {
            panic!("store unavailable")
        }
    }

    fn router() -> Router<()> {
        create_router(AppState::new(
            Arc::new(MemoryStore::new()),
            ServerConfig::for_tests(),
        ))
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = router()
            .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "route not found");
    }

    #[tokio::test]
    async fn test_bad_bearer_token_is_rejected() {
        let request = Request::post("/api/forms")
            .header("authorization", "Bearer garbage")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"title":"x"}"#))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_internal_error() {
        let app = create_router(AppState::new(Arc::new(BrokenStore), ServerConfig::for_tests()));
        let uri = format!("/api/forms/{}", Uuid::new_v4());

        let response = app
            .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal server error");
        assert_eq!(json["status"], 500);
    }
}
