//! Form fixtures

use axum_test::TestServer;
use formhub::shared::Form;
use serde_json::{json, Value};

/// A form with one single-choice question offering "Red" and "Blue"
pub fn colour_poll(access: &str) -> Value {
    json!({
        "title": "Colour poll",
        "description": "Pick one",
        "access": access,
        "questions": [
            {
                "text": "Favourite colour",
                "type": "SINGLE_CHOICE",
                "required": true,
                "order": 0,
                "options": [
                    { "text": "Red", "order": 0 },
                    { "text": "Blue", "order": 1 }
                ]
            }
        ]
    })
}

/// Create a form through the API
pub async fn create_test_form(server: &TestServer, token: &str, input: &Value) -> Form {
    let response = server
        .post("/api/forms")
        .authorization_bearer(token)
        .json(input)
        .await;
    response.assert_status_ok();
    response.json()
}
