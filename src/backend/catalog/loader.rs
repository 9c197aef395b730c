//! Eager loading of form trees
//!
//! Forms are read with three queries (forms, their questions, those
//! questions' options) and stitched together here. Questions and options come
//! back sorted by `order`.

use std::collections::HashMap;

use uuid::Uuid;

use crate::backend::store::{Datastore, FormRow, OptionRow, QuestionRow, StoreResult};
use crate::shared::{Form, FormsFilter, Question, QuestionOption};

impl From<OptionRow> for QuestionOption {
    fn from(row: OptionRow) -> Self {
        Self {
            id: row.id,
            question_id: row.question_id,
            text: row.text,
            order: row.order,
        }
    }
}

/// Attach options to their questions, both sorted by `order`
pub fn assemble_questions(questions: Vec<QuestionRow>, options: Vec<OptionRow>) -> Vec<Question> {
    let mut options_by_question: HashMap<Uuid, Vec<QuestionOption>> = HashMap::new();
    for option in options {
        options_by_question
            .entry(option.question_id)
            .or_default()
            .push(option.into());
    }

    let mut assembled: Vec<Question> = questions
        .into_iter()
        .map(|row| {
            let mut options = options_by_question.remove(&row.id).unwrap_or_default();
            options.sort_by_key(|option| option.order);
            Question {
                id: row.id,
                form_id: row.form_id,
                text: row.text,
                question_type: row.question_type,
                required: row.required,
                order: row.order,
                options,
            }
        })
        .collect();
    assembled.sort_by_key(|question| question.order);
    assembled
}

/// Attach questions to their forms, keeping the order of `forms`
pub fn assemble_forms(forms: Vec<FormRow>, questions: Vec<Question>) -> Vec<Form> {
    let mut questions_by_form: HashMap<Uuid, Vec<Question>> = HashMap::new();
    for question in questions {
        questions_by_form
            .entry(question.form_id)
            .or_default()
            .push(question);
    }

    forms
        .into_iter()
        .map(|row| Form {
            questions: questions_by_form.remove(&row.id).unwrap_or_default(),
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            access: row.access,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect()
}

async fn load_trees(store: &dyn Datastore, forms: Vec<FormRow>) -> StoreResult<Vec<Form>> {
    if forms.is_empty() {
        return Ok(Vec::new());
    }
    let form_ids: Vec<Uuid> = forms.iter().map(|form| form.id).collect();
    let questions = store.questions_for_forms(&form_ids).await?;
    let question_ids: Vec<Uuid> = questions.iter().map(|question| question.id).collect();
    let options = store.options_for_questions(&question_ids).await?;

    Ok(assemble_forms(forms, assemble_questions(questions, options)))
}

/// One form with its full question/option tree
pub async fn load_form(store: &dyn Datastore, id: Uuid) -> StoreResult<Option<Form>> {
    let Some(form) = store.find_form(id).await? else {
        return Ok(None);
    };
    Ok(load_trees(store, vec![form]).await?.pop())
}

/// Every form matching `filter`, newest first
pub async fn load_forms(store: &dyn Datastore, filter: &FormsFilter) -> StoreResult<Vec<Form>> {
    let forms = store.list_forms(filter).await?;
    load_trees(store, forms).await
}

/// Questions by id with their options, keyed by question id
pub async fn load_questions(
    store: &dyn Datastore,
    ids: &[Uuid],
) -> StoreResult<HashMap<Uuid, Question>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let questions = store.questions_by_ids(ids).await?;
    let question_ids: Vec<Uuid> = questions.iter().map(|question| question.id).collect();
    let options = store.options_for_questions(&question_ids).await?;

    Ok(assemble_questions(questions, options)
        .into_iter()
        .map(|question| (question.id, question))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::QuestionType;

    fn question(form_id: Uuid, order: i32) -> QuestionRow {
        QuestionRow {
            id: Uuid::new_v4(),
            form_id,
            text: format!("Q{}", order),
            question_type: QuestionType::SingleChoice,
            required: false,
            order,
        }
    }

    fn option(question_id: Uuid, order: i32) -> OptionRow {
        OptionRow {
            id: Uuid::new_v4(),
            question_id,
            text: format!("O{}", order),
            order,
        }
    }

    #[test]
    fn test_assemble_sorts_by_order() {
        let form_id = Uuid::new_v4();
        let second = question(form_id, 2);
        let first = question(form_id, 1);
        let options = vec![option(first.id, 5), option(first.id, 0), option(second.id, 1)];

        let assembled = assemble_questions(vec![second.clone(), first.clone()], options);

        assert_eq!(assembled[0].id, first.id);
        assert_eq!(assembled[1].id, second.id);
        let orders: Vec<i32> = assembled[0].options.iter().map(|o| o.order).collect();
        assert_eq!(orders, vec![0, 5]);
        assert_eq!(assembled[1].options.len(), 1);
    }
}
