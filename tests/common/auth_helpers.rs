//! Authentication test helpers

use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

/// A signed-up user and its bearer token
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Sign up a user through the API
pub async fn create_test_user(server: &TestServer, email: &str, password: &str) -> TestUser {
    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "email": email,
            "password": password,
            "displayName": "Test User",
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    TestUser {
        id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
        email: email.to_string(),
        token: body["token"].as_str().unwrap().to_string(),
    }
}

/// Sign up a user with a unique email
pub async fn create_unique_test_user(server: &TestServer) -> TestUser {
    let email = format!("test_{}@example.com", Uuid::new_v4());
    create_test_user(server, &email, "test_password_123").await
}
