//! Form Catalog operations
//!
//! Every mutation runs in one `StoreTx`. Returning early with `?` drops the
//! transaction, which rolls back everything written so far. Child rows are
//! always removed before their parents: options, then questions, then the
//! form; for responses, answer-option join rows, then answers, then the
//! responses themselves.
//!
//! Reads (`get_form`, `list_forms`) are not ownership-checked.

use chrono::Utc;
use uuid::Uuid;

use crate::backend::catalog::loader::{assemble_questions, load_form, load_forms};
use crate::backend::error::BackendError;
use crate::backend::middleware::Caller;
use crate::backend::store::{Datastore, FormRow, OptionRow, QuestionRow, StoreTx};
use crate::shared::{
    Form, FormInput, FormPatch, FormsFilter, OptionInput, OptionPatch, Question, QuestionInput,
    QuestionOption, QuestionPatch,
};

fn form_not_found() -> BackendError {
    BackendError::not_found("form not found")
}

fn question_not_found() -> BackendError {
    BackendError::not_found("question not found")
}

fn option_not_found() -> BackendError {
    BackendError::not_found("option not found")
}

/// Fetch a form inside `tx` and make sure `user_id` owns it
async fn owned_form(
    tx: &mut dyn StoreTx,
    form_id: Uuid,
    user_id: Uuid,
    denied: &'static str,
) -> Result<FormRow, BackendError> {
    let form = tx.find_form(form_id).await?.ok_or_else(form_not_found)?;
    if form.owner_id != user_id {
        tracing::warn!(%form_id, %user_id, "{}", denied);
        return Err(BackendError::access_denied(denied));
    }
    Ok(form)
}

async fn insert_options(
    tx: &mut dyn StoreTx,
    question_id: Uuid,
    options: &[OptionInput],
) -> Result<(), BackendError> {
    for input in options {
        let option = OptionRow {
            id: Uuid::new_v4(),
            question_id,
            text: input.text.clone(),
            order: input.order,
        };
        tx.insert_option(&option).await?;
    }
    Ok(())
}

async fn insert_questions(
    tx: &mut dyn StoreTx,
    form_id: Uuid,
    questions: &[QuestionInput],
) -> Result<(), BackendError> {
    for input in questions {
        let question = QuestionRow {
            id: Uuid::new_v4(),
            form_id,
            text: input.text.clone(),
            question_type: input.question_type.clone(),
            required: input.required,
            order: input.order,
        };
        tx.insert_question(&question).await?;
        insert_options(tx, question.id, &input.options).await?;
    }
    Ok(())
}

/// Delete every question of a form, each one's options first
async fn clear_questions(tx: &mut dyn StoreTx, form_id: Uuid) -> Result<(), BackendError> {
    for question in tx.questions_for_form(form_id).await? {
        tx.delete_options_for_question(question.id).await?;
    }
    let removed = tx.delete_questions_for_form(form_id).await?;
    tracing::debug!(%form_id, removed, "cleared questions");
    Ok(())
}

/// Delete every response of a form with its answers and join rows
async fn clear_responses(tx: &mut dyn StoreTx, form_id: Uuid) -> Result<(), BackendError> {
    let response_ids = tx.response_ids_for_form(form_id).await?;
    if response_ids.is_empty() {
        return Ok(());
    }
    tx.delete_answer_options_for_responses(&response_ids).await?;
    tx.delete_answers_for_responses(&response_ids).await?;
    let removed = tx.delete_responses_for_form(form_id).await?;
    tracing::debug!(%form_id, removed, "cleared responses");
    Ok(())
}

async fn write_new_form(
    tx: &mut dyn StoreTx,
    form: &FormRow,
    questions: &[QuestionInput],
) -> Result<(), BackendError> {
    tx.insert_form(form).await?;
    insert_questions(tx, form.id, questions).await
}

/// Create a form owned by the caller, with its questions and options
pub async fn create_form(
    store: &dyn Datastore,
    caller: &Caller,
    input: FormInput,
) -> Result<Form, BackendError> {
    let owner_id = caller.require()?;
    let now = Utc::now();
    let form = FormRow {
        id: Uuid::new_v4(),
        owner_id,
        title: input.title,
        description: input.description,
        access: input.access,
        created_at: now,
        updated_at: now,
    };

    let mut tx = store.begin().await?;
    let result = write_new_form(tx.as_mut(), &form, &input.questions).await;
    let written = match result {
        Ok(()) => tx.commit().await.map_err(BackendError::from),
        Err(err) => Err(err),
    };
    if let Err(err) = written {
        tracing::error!(error = %err, "failed to create form");
        return Err(BackendError::internal("failed to create form"));
    }

    tracing::info!(form_id = %form.id, %owner_id, questions = input.questions.len(), "form created");
    load_form(store, form.id)
        .await?
        .ok_or_else(|| BackendError::internal("failed to create form"))
}

/// Apply a sparse patch to a form owned by the caller
///
/// A present `questions` list replaces all existing questions.
pub async fn update_form(
    store: &dyn Datastore,
    caller: &Caller,
    form_id: Uuid,
    patch: FormPatch,
) -> Result<Form, BackendError> {
    let user_id = caller.require()?;

    let mut tx = store.begin().await?;
    let mut form = owned_form(tx.as_mut(), form_id, user_id, "not authorized to update this form").await?;

    if let Some(title) = patch.title {
        form.title = title;
    }
    if let Some(description) = patch.description {
        form.description = description;
    }
    if let Some(access) = patch.access {
        form.access = access;
    }
    form.updated_at = Utc::now();
    tx.update_form(&form).await?;

    if let Some(questions) = &patch.questions {
        clear_questions(tx.as_mut(), form_id).await?;
        insert_questions(tx.as_mut(), form_id, questions).await?;
    }
    tx.commit().await?;

    tracing::info!(%form_id, "form updated");
    load_form(store, form_id).await?.ok_or_else(form_not_found)
}

/// Delete a form owned by the caller together with everything under it
pub async fn delete_form(
    store: &dyn Datastore,
    caller: &Caller,
    form_id: Uuid,
) -> Result<bool, BackendError> {
    let user_id = caller.require()?;

    let mut tx = store.begin().await?;
    owned_form(tx.as_mut(), form_id, user_id, "not authorized to delete this form").await?;

    clear_responses(tx.as_mut(), form_id).await?;
    clear_questions(tx.as_mut(), form_id).await?;
    tx.delete_form(form_id).await?;
    tx.commit().await?;

    tracing::info!(%form_id, "form deleted");
    Ok(true)
}

/// Apply a sparse patch to a question of a form owned by the caller
///
/// A present `options` list replaces all existing options.
pub async fn update_question(
    store: &dyn Datastore,
    caller: &Caller,
    question_id: Uuid,
    patch: QuestionPatch,
) -> Result<Question, BackendError> {
    let user_id = caller.require()?;

    let mut tx = store.begin().await?;
    let mut question = tx
        .find_question(question_id)
        .await?
        .ok_or_else(question_not_found)?;
    owned_form(
        tx.as_mut(),
        question.form_id,
        user_id,
        "not authorized to modify this question",
    )
    .await?;

    if let Some(text) = patch.text {
        question.text = text;
    }
    if let Some(question_type) = patch.question_type {
        question.question_type = question_type;
    }
    if let Some(required) = patch.required {
        question.required = required;
    }
    if let Some(order) = patch.order {
        question.order = order;
    }
    tx.update_question(&question).await?;

    if let Some(options) = &patch.options {
        tx.delete_options_for_question(question_id).await?;
        insert_options(tx.as_mut(), question_id, options).await?;
    }
    tx.commit().await?;

    tracing::info!(%question_id, "question updated");
    let options = store.options_for_questions(&[question_id]).await?;
    assemble_questions(vec![question], options)
        .pop()
        .ok_or_else(question_not_found)
}

/// Delete a question and its options
pub async fn delete_question(
    store: &dyn Datastore,
    caller: &Caller,
    question_id: Uuid,
) -> Result<bool, BackendError> {
    let user_id = caller.require()?;

    let mut tx = store.begin().await?;
    let question = tx
        .find_question(question_id)
        .await?
        .ok_or_else(question_not_found)?;
    owned_form(
        tx.as_mut(),
        question.form_id,
        user_id,
        "not authorized to delete this question",
    )
    .await?;

    tx.delete_options_for_question(question_id).await?;
    tx.delete_question(question_id).await?;
    tx.commit().await?;

    tracing::info!(%question_id, "question deleted");
    Ok(true)
}

/// Apply a sparse patch to an option
pub async fn update_option(
    store: &dyn Datastore,
    caller: &Caller,
    option_id: Uuid,
    patch: OptionPatch,
) -> Result<QuestionOption, BackendError> {
    let user_id = caller.require()?;

    let mut tx = store.begin().await?;
    let mut option = tx.find_option(option_id).await?.ok_or_else(option_not_found)?;
    let question = tx
        .find_question(option.question_id)
        .await?
        .ok_or_else(question_not_found)?;
    owned_form(
        tx.as_mut(),
        question.form_id,
        user_id,
        "not authorized to modify this option",
    )
    .await?;

    if let Some(text) = patch.text {
        option.text = text;
    }
    if let Some(order) = patch.order {
        option.order = order;
    }
    tx.update_option(&option).await?;
    tx.commit().await?;

    tracing::info!(%option_id, "option updated");
    Ok(option.into())
}

pub async fn delete_option(
    store: &dyn Datastore,
    caller: &Caller,
    option_id: Uuid,
) -> Result<bool, BackendError> {
    let user_id = caller.require()?;

    let mut tx = store.begin().await?;
    let option = tx.find_option(option_id).await?.ok_or_else(option_not_found)?;
    let question = tx
        .find_question(option.question_id)
        .await?
        .ok_or_else(question_not_found)?;
    owned_form(
        tx.as_mut(),
        question.form_id,
        user_id,
        "not authorized to delete this option",
    )
    .await?;

    tx.delete_option(option_id).await?;
    tx.commit().await?;

    tracing::info!(%option_id, "option deleted");
    Ok(true)
}

/// A form with its full tree, or `None`
pub async fn get_form(store: &dyn Datastore, form_id: Uuid) -> Result<Option<Form>, BackendError> {
    Ok(load_form(store, form_id).await?)
}

/// Forms matching `filter`, newest first
pub async fn list_forms(store: &dyn Datastore, filter: &FormsFilter) -> Result<Vec<Form>, BackendError> {
    Ok(load_forms(store, filter).await?)
}
