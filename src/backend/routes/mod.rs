//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! ├── api_routes.rs   - Health and account endpoints
//! └── form_routes.rs  - Form catalog and response endpoints
//! ```
//!
//! # Route Types
//!
//! ## API Routes
//!
//! - `GET /health` - Liveness check
//! - `POST /api/auth/signup` - User registration
//! - `POST /api/auth/login` - User login
//! - `GET /api/auth/me` - Get current user
//!
//! ## Form Routes
//!
//! - `POST /api/forms`, `GET /api/forms` - Create and list forms
//! - `GET|PATCH|DELETE /api/forms/{id}` - Read, update, delete one form
//! - `GET /api/forms/{id}/responses` - Responses of a form (owner only)
//! - `PATCH|DELETE /api/questions/{id}` - Update or delete a question
//! - `PATCH|DELETE /api/options/{id}` - Update or delete an option
//! - `POST /api/responses` - Submit a response
//! - `GET /api/responses/{id}` - Read one response (owner only)
//!
//! Unknown paths fall through to a JSON 404.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use formhub::backend::routes::create_router;
//! use formhub::backend::server::{AppState, ServerConfig};
//! use formhub::backend::store::MemoryStore;
//!
//! let state = AppState::new(Arc::new(MemoryStore::new()), ServerConfig::default());
//! let router = create_router(state);
//! ```

/// Main router creation
pub mod router;

/// Health and account endpoints
pub mod api_routes;

/// Form catalog and response endpoints
pub mod form_routes;

pub use router::create_router;
