//! Response Ingestion operations
//!
//! A submission is written in one transaction: the response row, then one
//! answer row per submitted answer, then one join row per selected option id.
//! Any failure (unknown question, unknown option, unparseable date) drops the
//! transaction and nothing of the submission is kept.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::ingestion::dto::{load_response, load_responses};
use crate::backend::middleware::Caller;
use crate::backend::store::{
    AnswerOptionRow, AnswerRow, Datastore, QuestionRow, ResponseRow, StoreTx,
};
use crate::shared::{
    AnswerInput, AnswerKind, AnswerValue, FormAccess, FormResponse, FormResponseInput, OptionRef,
    QuestionType,
};

fn parse_date(raw: &str) -> Result<DateTime<Utc>, BackendError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| BackendError::validation(format!("invalid date format: {}", raw)))
}

/// Turn one submitted answer into the value its question's type calls for
async fn resolve_value(
    tx: &mut dyn StoreTx,
    question: &QuestionRow,
    input: &AnswerInput,
) -> Result<AnswerValue, BackendError> {
    let value = match question.question_type.answer_kind() {
        AnswerKind::Bool => AnswerValue::Bool(input.bool_value),
        AnswerKind::Number => AnswerValue::Number(input.number_value),
        AnswerKind::Date => AnswerValue::Date(input.date_value.as_deref().map(parse_date).transpose()?),
        AnswerKind::Choice => {
            let mut selected = Vec::with_capacity(input.option_ids.len());
            for option_id in &input.option_ids {
                let option = tx.find_option(*option_id).await?.ok_or_else(|| {
                    BackendError::not_found(format!("option not found: {}", option_id))
                })?;
                selected.push(OptionRef {
                    id: option.id,
                    text: option.text,
                });
            }
            AnswerValue::Choice(selected)
        }
        AnswerKind::Text => {
            if let QuestionType::Unknown(tag) = &question.question_type {
                tracing::warn!(question_id = %question.id, %tag, "unknown question type, storing answer as text");
            }
            AnswerValue::Text(input.text_value.clone().unwrap_or_default())
        }
    };
    Ok(value)
}

async fn write_answers(
    tx: &mut dyn StoreTx,
    response_id: Uuid,
    answers: &[AnswerInput],
) -> Result<(), BackendError> {
    for input in answers {
        let question = tx.find_question(input.question_id).await?.ok_or_else(|| {
            BackendError::not_found(format!("question not found: {}", input.question_id))
        })?;
        let value = resolve_value(tx, &question, input).await?;

        let answer = AnswerRow {
            id: Uuid::new_v4(),
            response_id,
            question_id: question.id,
            text_value: value.text_value().to_string(),
            bool_value: value.bool_value(),
            number_value: value.number_value(),
            date_value: value.date_value(),
        };
        tx.insert_answer(&answer).await?;

        for option in value.selected() {
            let join = AnswerOptionRow {
                id: Uuid::new_v4(),
                answer_id: answer.id,
                option_id: option.id,
            };
            tx.insert_answer_option(&join).await?;
        }
    }
    Ok(())
}

/// Submit a response to a form
///
/// Private forms only accept submissions from their owner; link-shared and
/// public forms accept anyone, including anonymous callers.
pub async fn submit_form_response(
    store: &dyn Datastore,
    caller: &Caller,
    input: FormResponseInput,
) -> Result<FormResponse, BackendError> {
    let form = store
        .find_form(input.form_id)
        .await?
        .ok_or_else(|| BackendError::not_found("form not found"))?;

    if form.access == FormAccess::Private && !caller.is(form.owner_id) {
        tracing::warn!(form_id = %form.id, caller = ?caller.user_id(), "submission to private form denied");
        return Err(BackendError::access_denied("access denied"));
    }

    let response = ResponseRow {
        id: Uuid::new_v4(),
        form_id: form.id,
        created_at: Utc::now(),
    };

    let mut tx = store.begin().await?;
    tx.insert_response(&response).await?;
    write_answers(tx.as_mut(), response.id, &input.answers).await?;
    tx.commit().await?;

    tracing::info!(
        response_id = %response.id,
        form_id = %form.id,
        answers = input.answers.len(),
        "response submitted"
    );
    load_response(store, response.id)
        .await?
        .ok_or_else(|| BackendError::internal("failed to read submitted response"))
}

/// Every response of a form owned by the caller, newest first
pub async fn form_responses(
    store: &dyn Datastore,
    caller: &Caller,
    form_id: Uuid,
) -> Result<Vec<FormResponse>, BackendError> {
    let user_id = caller.require()?;
    let form = store
        .find_form(form_id)
        .await?
        .ok_or_else(|| BackendError::not_found("form not found"))?;
    if form.owner_id != user_id {
        return Err(BackendError::access_denied("access denied"));
    }

    let rows = store.responses_for_form(form_id).await?;
    Ok(load_responses(store, rows).await?)
}

/// One response, readable only by the owner of its form
pub async fn form_response(
    store: &dyn Datastore,
    caller: &Caller,
    response_id: Uuid,
) -> Result<FormResponse, BackendError> {
    let user_id = caller.require()?;
    let response = store
        .find_response(response_id)
        .await?
        .ok_or_else(|| BackendError::not_found("response not found"))?;
    let form = store
        .find_form(response.form_id)
        .await?
        .ok_or_else(|| BackendError::not_found("form not found"))?;
    if form.owner_id != user_id {
        return Err(BackendError::access_denied("access denied"));
    }

    load_responses(store, vec![response])
        .await?
        .pop()
        .ok_or_else(|| BackendError::not_found("response not found"))
}
