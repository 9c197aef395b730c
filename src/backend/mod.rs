//! Backend Module
//!
//! This module contains all server-side code for formhub: an Axum HTTP
//! server exposing form definitions and form responses as a JSON API.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`catalog`** - Forms, questions and options
//! - **`ingestion`** - Response submission and response reads
//! - **`auth`** - Accounts, password hashing, JWT tokens
//! - **`middleware`** - Caller extraction from the `Authorization` header
//! - **`store`** - `Datastore` trait with PostgreSQL and in-memory backends
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── catalog/        - Form catalog
//! ├── ingestion/      - Response ingestion
//! ├── auth/           - Authentication
//! ├── middleware/     - Request extractors
//! ├── store/          - Persistence
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` holding the datastore behind
//! `Arc<dyn Datastore>` and the loaded `ServerConfig`. Handlers pull the
//! piece they need with `State<...>` through `FromRef`.
//!
//! # Transactions
//!
//! Every mutating operation runs in exactly one store transaction. A failed
//! operation leaves no partial writes behind.

/// Server initialization and configuration
pub mod server;

/// HTTP route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Accounts and tokens
pub mod auth;

/// Request extractors
pub mod middleware;

/// Persistence
pub mod store;

/// Form catalog
pub mod catalog;

/// Response ingestion
pub mod ingestion;

pub use error::BackendError;
pub use server::{create_app, create_app_with_store, AppState, ServerConfig};
