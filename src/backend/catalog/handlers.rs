//! Form Catalog HTTP handlers
//!
//! Thin wrappers: extract the caller and body, call the service, wrap the
//! result in `Json`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use uuid::Uuid;

use crate::backend::catalog::service;
use crate::backend::error::BackendError;
use crate::backend::middleware::Caller;
use crate::backend::store::Datastore;
use crate::shared::{
    Form, FormInput, FormPatch, FormsFilter, OptionPatch, Question, QuestionOption, QuestionPatch,
};

/// POST /api/forms
pub async fn create_form(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
    Json(input): Json<FormInput>,
) -> Result<Json<Form>, BackendError> {
    service::create_form(store.as_ref(), &caller, input)
        .await
        .map(Json)
}

/// PATCH /api/forms/{id}
pub async fn update_form(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(patch): Json<FormPatch>,
) -> Result<Json<Form>, BackendError> {
    service::update_form(store.as_ref(), &caller, id, patch)
        .await
        .map(Json)
}

/// DELETE /api/forms/{id}
pub async fn delete_form(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<bool>, BackendError> {
    service::delete_form(store.as_ref(), &caller, id)
        .await
        .map(Json)
}

/// GET /api/forms/{id}; responds `null` for an unknown id
pub async fn get_form(
    State(store): State<Arc<dyn Datastore>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<Form>>, BackendError> {
    service::get_form(store.as_ref(), id).await.map(Json)
}

/// GET /api/forms?ownerId=&access=
pub async fn list_forms(
    State(store): State<Arc<dyn Datastore>>,
    Query(filter): Query<FormsFilter>,
) -> Result<Json<Vec<Form>>, BackendError> {
    service::list_forms(store.as_ref(), &filter).await.map(Json)
}

/// PATCH /api/questions/{id}
pub async fn update_question(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(patch): Json<QuestionPatch>,
) -> Result<Json<Question>, BackendError> {
    service::update_question(store.as_ref(), &caller, id, patch)
        .await
        .map(Json)
}

/// DELETE /api/questions/{id}
pub async fn delete_question(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<bool>, BackendError> {
    service::delete_question(store.as_ref(), &caller, id)
        .await
        .map(Json)
}

/// PATCH /api/options/{id}
pub async fn update_option(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(patch): Json<OptionPatch>,
) -> Result<Json<QuestionOption>, BackendError> {
    service::update_option(store.as_ref(), &caller, id, patch)
        .await
        .map(Json)
}

/// DELETE /api/options/{id}
pub async fn delete_option(
    State(store): State<Arc<dyn Datastore>>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<bool>, BackendError> {
    service::delete_option(store.as_ref(), &caller, id)
        .await
        .map(Json)
}
