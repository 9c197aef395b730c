//! Denormalized response reads
//!
//! Responses are re-read after commit and turned into [`FormResponse`]
//! values: each answer carries its question (when it still exists) and the
//! options it selected, deduplicated by option id.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::backend::catalog::loader::load_questions;
use crate::backend::store::{AnswerRow, Datastore, ResponseRow, StoreResult};
use crate::shared::{Answer, FormResponse, OptionRef, Question};

/// Drop repeated option ids, keeping the first occurrence of each
pub fn dedupe_options(options: Vec<OptionRef>) -> Vec<OptionRef> {
    let mut seen = HashSet::new();
    options
        .into_iter()
        .filter(|option| seen.insert(option.id))
        .collect()
}

fn to_answer(
    row: AnswerRow,
    questions: &HashMap<Uuid, Question>,
    selected: &mut HashMap<Uuid, Vec<OptionRef>>,
) -> Answer {
    Answer {
        question: questions.get(&row.question_id).cloned(),
        selected_options: dedupe_options(selected.remove(&row.id).unwrap_or_default()),
        id: row.id,
        question_id: row.question_id,
        text_value: row.text_value,
        bool_value: row.bool_value,
        number_value: row.number_value,
        date_value: row.date_value,
    }
}

/// Build the DTOs for `responses`, preserving their order
///
/// Answers within a response follow their question's `order`; answers whose
/// question is gone sort last.
pub async fn load_responses(
    store: &dyn Datastore,
    responses: Vec<ResponseRow>,
) -> StoreResult<Vec<FormResponse>> {
    if responses.is_empty() {
        return Ok(Vec::new());
    }

    let response_ids: Vec<Uuid> = responses.iter().map(|response| response.id).collect();
    let answers = store.answers_for_responses(&response_ids).await?;

    let answer_ids: Vec<Uuid> = answers.iter().map(|answer| answer.id).collect();
    let mut selected: HashMap<Uuid, Vec<OptionRef>> = HashMap::new();
    for (answer_id, option) in store.selected_options(&answer_ids).await? {
        selected.entry(answer_id).or_default().push(OptionRef {
            id: option.id,
            text: option.text,
        });
    }

    let mut question_ids: Vec<Uuid> = answers.iter().map(|answer| answer.question_id).collect();
    question_ids.sort_unstable();
    question_ids.dedup();
    let questions = load_questions(store, &question_ids).await?;

    let mut by_response: HashMap<Uuid, Vec<Answer>> = HashMap::new();
    for row in answers {
        let response_id = row.response_id;
        let answer = to_answer(row, &questions, &mut selected);
        by_response.entry(response_id).or_default().push(answer);
    }

    Ok(responses
        .into_iter()
        .map(|response| {
            let mut answers = by_response.remove(&response.id).unwrap_or_default();
            answers.sort_by_key(|answer| {
                let order = answer.question.as_ref().map_or(i32::MAX, |q| q.order);
                (order, answer.id)
            });
            FormResponse {
                id: response.id,
                form_id: response.form_id,
                created_at: response.created_at,
                answers,
            }
        })
        .collect())
}

/// One response by id, or `None`
pub async fn load_response(store: &dyn Datastore, id: Uuid) -> StoreResult<Option<FormResponse>> {
    let Some(response) = store.find_response(id).await? else {
        return Ok(None);
    };
    Ok(load_responses(store, vec![response]).await?.pop())
}
