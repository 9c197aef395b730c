//! Shared Error Types
//!
//! Errors produced while decoding the wire types in [`crate::shared`]. They
//! carry no HTTP semantics: serde reports them as deserialization failures
//! and the Postgres store reports them as corrupt rows.
//!
//! # Usage
//!
//! ```rust
//! use formhub::shared::error::SharedError;
//! use formhub::shared::FormAccess;
//!
//! let error = "SECRET".parse::<FormAccess>().unwrap_err();
//! assert_eq!(error, SharedError::unknown_variant("form access", "SECRET"));
//! ```
use thiserror::Error;

/// Shared error types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SharedError {
    /// A string tag that names no known variant
    #[error("unknown {type_name}: {value}")]
    UnknownVariant {
        /// Name of the enum being parsed
        type_name: &'static str,
        /// The offending tag
        value: String,
    },
}

impl SharedError {
    /// Create a new unknown-variant error
    pub fn unknown_variant(type_name: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            type_name,
            value: value.into(),
        }
    }
}
