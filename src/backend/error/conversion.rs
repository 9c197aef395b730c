/**
 * Error Conversion
 *
 * `BackendError` implements `IntoResponse`, so handlers return it directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "form not found",
 *   "status": 404
 * }
 * ```
 */

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if self.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "request rejected");
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

/// Body of the JSON 404 returned for unknown routes
pub async fn not_found_fallback() -> Response {
    let body = serde_json::json!({
        "error": "route not found",
        "status": StatusCode::NOT_FOUND.as_u16(),
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Response for a handler that panicked, used with `CatchPanicLayer::custom`
///
/// The panic payload is logged; the client only sees the generic internal
/// error body.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    let body = serde_json::json!({
        "error": "internal server error",
        "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
