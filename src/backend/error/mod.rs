//! Backend Error Module
//!
//! This module defines the error type used by services and HTTP handlers.
//! Every `BackendError` converts into a JSON HTTP response.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - BackendError and its status mapping
//! └── conversion.rs - IntoResponse, the JSON 404 fallback and panic responses
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use formhub::backend::error::BackendError;
//! use axum::Json;
//!
//! async fn handler() -> Result<Json<bool>, BackendError> {
//!     Err(BackendError::not_found("form not found"))
//! }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use conversion::{not_found_fallback, panic_response};
pub use types::BackendError;
