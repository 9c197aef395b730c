//! Middleware Module
//!
//! Request processing shared by all routes.
//!
//! - **`auth`** - the `Caller` extractor resolving the bearer token
//!
//! # Example
//!
//! ```rust,no_run
//! use formhub::backend::middleware::Caller;
//! use formhub::backend::error::BackendError;
//!
//! async fn handler(caller: Caller) -> Result<String, BackendError> {
//!     let user_id = caller.require()?;
//!     Ok(user_id.to_string())
//! }
//! ```

pub mod auth;

pub use auth::Caller;
