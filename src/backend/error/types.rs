/**
 * Backend Error Types
 *
 * This module defines the error type returned by every service operation and
 * HTTP handler of the backend.
 *
 * # Error Categories
 *
 * ## Client errors
 *
 * - `NotFound` - a form, question, option or response does not exist
 * - `AccessDenied` - the caller is authenticated but may not touch the resource
 * - `AuthenticationRequired` - the operation needs a signed-in caller
 * - `Validation` - the input is malformed (bad date, short password)
 * - `Conflict` - a uniqueness rule was violated (duplicate email)
 *
 * ## Server errors
 *
 * - `Store` - the datastore failed
 * - `Internal` - any other unexpected failure
 *
 * Server errors never leak their details to the client; the body carries a
 * generic message and the cause is logged.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use formhub::backend::error::BackendError;
///
/// let err = BackendError::not_found("form not found");
/// assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    AccessDenied { message: String },

    #[error("{message}")]
    AuthenticationRequired { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Conflict { message: String },

    /// Datastore failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Unexpected failure; `message` is safe to show to clients
    #[error("{message}")]
    Internal { message: String },
}

impl BackendError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// The caller must sign in first
    pub fn authentication_required(message: impl Into<String>) -> Self {
        Self::AuthenticationRequired {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `NotFound` - 404
    /// - `AccessDenied` - 403
    /// - `AuthenticationRequired` - 401
    /// - `Validation` - 400
    /// - `Conflict` - 409
    /// - `Store` / `Internal` - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AccessDenied { .. } => StatusCode::FORBIDDEN,
            Self::AuthenticationRequired { .. } => StatusCode::UNAUTHORIZED,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing error message
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { message }
            | Self::AccessDenied { message }
            | Self::AuthenticationRequired { message }
            | Self::Validation { message }
            | Self::Conflict { message }
            | Self::Internal { message } => message.clone(),
            Self::Store(StoreError::Conflict(_)) => "resource already exists".to_string(),
            Self::Store(_) => "internal server error".to_string(),
        }
    }

    /// Whether this is a server-side failure that should be logged as an error
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_not_found_error() {
        let error = BackendError::not_found("form not found");
        assert_matches!(&error, BackendError::NotFound { message } if message == "form not found");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "form not found");
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            BackendError::access_denied("access denied").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BackendError::authentication_required("authorization required").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::validation("invalid date format: x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::conflict("Email already registered").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BackendError::internal("failed to create form").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_errors_hide_details() {
        let error: BackendError = StoreError::Corrupt("bad access tag".to_string()).into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message(), "internal server error");
        assert!(error.is_server_error());
    }

    #[test]
    fn test_store_conflict_maps_to_409() {
        let error: BackendError = StoreError::Conflict("users_email_key".to_string()).into();
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
        assert!(!error.is_server_error());
    }
}
