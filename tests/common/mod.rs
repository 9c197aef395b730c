//! Common test utilities and helpers
//!
//! - Test server construction over a fresh in-memory store
//! - Authentication helpers
//! - Form fixtures
//! - PostgreSQL fixtures, active when `DATABASE_URL` is set

#![allow(dead_code)]

pub mod auth_helpers;
pub mod database;
pub mod fixtures;

pub use auth_helpers::*;
pub use fixtures::*;

use std::sync::Arc;

use axum_test::TestServer;
use formhub::backend::server::{create_app_with_store, ServerConfig};
use formhub::backend::store::MemoryStore;

/// A test server over an empty in-memory store
pub fn create_test_server() -> TestServer {
    let app = create_app_with_store(Arc::new(MemoryStore::new()), ServerConfig::for_tests());
    TestServer::new(app).unwrap()
}
