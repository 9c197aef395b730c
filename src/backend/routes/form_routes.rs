//! Form catalog and response routes

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::backend::catalog::handlers as catalog;
use crate::backend::ingestion::handlers as ingestion;
use crate::backend::server::state::AppState;

/// Configure form, question, option and response routes
///
/// Ownership is checked in the services, not here: every route accepts an
/// anonymous caller and the service decides whether that is enough.
pub fn configure_form_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/forms", post(catalog::create_form).get(catalog::list_forms))
        .route(
            "/api/forms/{id}",
            get(catalog::get_form)
                .patch(catalog::update_form)
                .delete(catalog::delete_form),
        )
        .route("/api/forms/{id}/responses", get(ingestion::form_responses))
        .route(
            "/api/questions/{id}",
            patch(catalog::update_question).delete(catalog::delete_question),
        )
        .route(
            "/api/options/{id}",
            patch(catalog::update_option).delete(catalog::delete_option),
        )
        .route("/api/responses", post(ingestion::submit_form_response))
        .route("/api/responses/{id}", get(ingestion::form_response))
}
