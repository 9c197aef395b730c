//! formhub - Main Library
//!
//! formhub is a forms-management backend: users authenticate, build forms out
//! of ordered questions and options, and collect responses.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types shared by the server and any client
//!   - Forms, questions, options and their input/patch shapes
//!   - Response submission input and the denormalized response shape
//!   - Shared error types
//!
//! - **`backend`** - Server-side code (only compiled with the `ssr` feature)
//!   - Axum HTTP server, routes and error responses
//!   - Form catalog and response ingestion services
//!   - Persistence behind the `Datastore` trait (PostgreSQL or in-memory)
//!   - Password accounts and JWT caller identity
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the `backend` module and the server binary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use formhub::backend::server::{config::ServerConfig, init::create_app};
//!
//! # async fn example() {
//! let config = ServerConfig::default();
//! let app = create_app(config).await;
//! // Serve `app` with axum::serve
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::error::SharedError` for unparseable enum tags on the wire
//! - `backend::store::StoreError` for persistence failures
//! - `backend::error::BackendError` for everything surfaced over HTTP

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
