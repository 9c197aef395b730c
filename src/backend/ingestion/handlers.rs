//! Response Ingestion HTTP handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::ingestion::service;
use crate::backend::middleware::Caller;
use crate::backend::store::Datastore;
use crate::shared::{FormResponse, FormResponseInput};

/// POST /api/responses
///
/// Anonymous callers may submit to `PUBLIC` and `BY_LINK` forms. A stale or
/// malformed bearer token is treated as anonymous here rather than rejected;
/// private forms then refuse the submission with "access denied".
pub async fn submit_form_response(
    State(store): State<Arc<dyn Datastore>>,
    caller: Result<Caller, BackendError>,
    Json(input): Json<FormResponseInput>,
) -> Result<Json<FormResponse>, BackendError> {
    let caller = match caller {
        Ok(caller) => caller,
        Err(BackendError::AuthenticationRequired { message }) => {
            tracing::debug!(reason = %message, "submitting as anonymous");
            Caller::Anonymous
        }
        Err(err) => return Err(err),
    };
    service::submit_form_response(store.as_ref(), &caller, input)
        .await
        .map(Json)
}

/// GET /api/forms/{id}/responses
pub async fn form_responses(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
    Path(form_id): Path<Uuid>,
) -> Result<Json<Vec<FormResponse>>, BackendError> {
    service::form_responses(store.as_ref(), &caller, form_id)
        .await
        .map(Json)
}

/// GET /api/responses/{id}
pub async fn form_response(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<FormResponse>, BackendError> {
    service::form_response(store.as_ref(), &caller, id)
        .await
        .map(Json)
}
