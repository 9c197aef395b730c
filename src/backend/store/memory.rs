//! In-memory datastore
//!
//! Every table is a `HashMap` keyed by row id, all of them behind a single
//! `tokio::sync::Mutex`. A transaction holds the lock for its whole lifetime
//! and keeps a snapshot of the tables taken at `begin`; if it is dropped
//! without committing, the snapshot is written back.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{
    AnswerOptionRow, AnswerRow, Datastore, FormRow, OptionRow, QuestionRow, ResponseRow,
    StoreError, StoreResult, StoreTx,
};
use crate::backend::auth::users::User;
use crate::shared::FormsFilter;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    forms: HashMap<Uuid, FormRow>,
    questions: HashMap<Uuid, QuestionRow>,
    options: HashMap<Uuid, OptionRow>,
    responses: HashMap<Uuid, ResponseRow>,
    answers: HashMap<Uuid, AnswerRow>,
    answer_options: HashMap<Uuid, AnswerOptionRow>,
}

/// Number of rows per table, for assertions in tests and debug logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub forms: usize,
    pub questions: usize,
    pub options: usize,
    pub responses: usize,
    pub answers: usize,
    pub answer_options: usize,
}

/// Process-local datastore
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn row_counts(&self) -> RowCounts {
        let tables = self.tables.lock().await;
        RowCounts {
            forms: tables.forms.len(),
            questions: tables.questions.len(),
            options: tables.options.len(),
            responses: tables.responses.len(),
            answers: tables.answers.len(),
            answer_options: tables.answer_options.len(),
        }
    }
}

fn id_set(ids: &[Uuid]) -> HashSet<Uuid> {
    ids.iter().copied().collect()
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.tables.clone().lock_owned().await;
        let snapshot = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            snapshot: Some(snapshot),
        }))
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "user with email {} already exists",
                user.email
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_form(&self, id: Uuid) -> StoreResult<Option<FormRow>> {
        Ok(self.tables.lock().await.forms.get(&id).cloned())
    }

    async fn list_forms(&self, filter: &FormsFilter) -> StoreResult<Vec<FormRow>> {
        let tables = self.tables.lock().await;
        let mut forms: Vec<FormRow> = tables
            .forms
            .values()
            .filter(|form| filter.owner_id.map_or(true, |owner| form.owner_id == owner))
            .filter(|form| filter.access.map_or(true, |access| form.access == access))
            .cloned()
            .collect();
        forms.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(forms)
    }

    async fn questions_for_forms(&self, form_ids: &[Uuid]) -> StoreResult<Vec<QuestionRow>> {
        let wanted = id_set(form_ids);
        let tables = self.tables.lock().await;
        let mut questions: Vec<QuestionRow> = tables
            .questions
            .values()
            .filter(|question| wanted.contains(&question.form_id))
            .cloned()
            .collect();
        questions.sort_by_key(|question| question.order);
        Ok(questions)
    }

    async fn questions_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<QuestionRow>> {
        let tables = self.tables.lock().await;
        Ok(id_set(ids)
            .iter()
            .filter_map(|id| tables.questions.get(id).cloned())
            .collect())
    }

    async fn options_for_questions(&self, question_ids: &[Uuid]) -> StoreResult<Vec<OptionRow>> {
        let wanted = id_set(question_ids);
        let tables = self.tables.lock().await;
        let mut options: Vec<OptionRow> = tables
            .options
            .values()
            .filter(|option| wanted.contains(&option.question_id))
            .cloned()
            .collect();
        options.sort_by_key(|option| option.order);
        Ok(options)
    }

    async fn find_option(&self, id: Uuid) -> StoreResult<Option<OptionRow>> {
        Ok(self.tables.lock().await.options.get(&id).cloned())
    }

    async fn find_response(&self, id: Uuid) -> StoreResult<Option<ResponseRow>> {
        Ok(self.tables.lock().await.responses.get(&id).cloned())
    }

    async fn responses_for_form(&self, form_id: Uuid) -> StoreResult<Vec<ResponseRow>> {
        let tables = self.tables.lock().await;
        let mut responses: Vec<ResponseRow> = tables
            .responses
            .values()
            .filter(|response| response.form_id == form_id)
            .cloned()
            .collect();
        responses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(responses)
    }

    async fn answers_for_responses(&self, response_ids: &[Uuid]) -> StoreResult<Vec<AnswerRow>> {
        let wanted = id_set(response_ids);
        let tables = self.tables.lock().await;
        Ok(tables
            .answers
            .values()
            .filter(|answer| wanted.contains(&answer.response_id))
            .cloned()
            .collect())
    }

    async fn selected_options(&self, answer_ids: &[Uuid]) -> StoreResult<Vec<(Uuid, OptionRow)>> {
        let wanted = id_set(answer_ids);
        let tables = self.tables.lock().await;
        Ok(tables
            .answer_options
            .values()
            .filter(|join| wanted.contains(&join.answer_id))
            .filter_map(|join| {
                tables
                    .options
                    .get(&join.option_id)
                    .map(|option| (join.answer_id, option.clone()))
            })
            .collect())
    }
}

/// Transaction over a `MemoryStore`
pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    /// Tables as they were at `begin`; `None` once committed
    snapshot: Option<Tables>,
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            tracing::debug!("rolling back in-memory transaction");
            *self.guard = snapshot;
        }
    }
}

fn missing(table: &str, id: Uuid) -> StoreError {
    StoreError::Corrupt(format!("no {} row with id {}", table, id))
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_form(&mut self, id: Uuid) -> StoreResult<Option<FormRow>> {
        Ok(self.guard.forms.get(&id).cloned())
    }

    async fn insert_form(&mut self, form: &FormRow) -> StoreResult<()> {
        self.guard.forms.insert(form.id, form.clone());
        Ok(())
    }

    async fn update_form(&mut self, form: &FormRow) -> StoreResult<()> {
        match self.guard.forms.get_mut(&form.id) {
            Some(row) => {
                *row = form.clone();
                Ok(())
            }
            None => Err(missing("form", form.id)),
        }
    }

    async fn delete_form(&mut self, id: Uuid) -> StoreResult<()> {
        self.guard.forms.remove(&id);
        Ok(())
    }

    async fn find_question(&mut self, id: Uuid) -> StoreResult<Option<QuestionRow>> {
        Ok(self.guard.questions.get(&id).cloned())
    }

    async fn questions_for_form(&mut self, form_id: Uuid) -> StoreResult<Vec<QuestionRow>> {
        let mut questions: Vec<QuestionRow> = self
            .guard
            .questions
            .values()
            .filter(|question| question.form_id == form_id)
            .cloned()
            .collect();
        questions.sort_by_key(|question| question.order);
        Ok(questions)
    }

    async fn insert_question(&mut self, question: &QuestionRow) -> StoreResult<()> {
        self.guard.questions.insert(question.id, question.clone());
        Ok(())
    }

    async fn update_question(&mut self, question: &QuestionRow) -> StoreResult<()> {
        match self.guard.questions.get_mut(&question.id) {
            Some(row) => {
                *row = question.clone();
                Ok(())
            }
            None => Err(missing("question", question.id)),
        }
    }

    async fn delete_question(&mut self, id: Uuid) -> StoreResult<()> {
        self.guard.questions.remove(&id);
        Ok(())
    }

    async fn delete_questions_for_form(&mut self, form_id: Uuid) -> StoreResult<u64> {
        let before = self.guard.questions.len();
        self.guard.questions.retain(|_, question| question.form_id != form_id);
        Ok((before - self.guard.questions.len()) as u64)
    }

    async fn find_option(&mut self, id: Uuid) -> StoreResult<Option<OptionRow>> {
        Ok(self.guard.options.get(&id).cloned())
    }

    async fn insert_option(&mut self, option: &OptionRow) -> StoreResult<()> {
        self.guard.options.insert(option.id, option.clone());
        Ok(())
    }

    async fn update_option(&mut self, option: &OptionRow) -> StoreResult<()> {
        match self.guard.options.get_mut(&option.id) {
            Some(row) => {
                *row = option.clone();
                Ok(())
            }
            None => Err(missing("option", option.id)),
        }
    }

    async fn delete_option(&mut self, id: Uuid) -> StoreResult<()> {
        self.guard.options.remove(&id);
        Ok(())
    }

    async fn delete_options_for_question(&mut self, question_id: Uuid) -> StoreResult<u64> {
        let before = self.guard.options.len();
        self.guard.options.retain(|_, option| option.question_id != question_id);
        Ok((before - self.guard.options.len()) as u64)
    }

    async fn insert_response(&mut self, response: &ResponseRow) -> StoreResult<()> {
        self.guard.responses.insert(response.id, response.clone());
        Ok(())
    }

    async fn insert_answer(&mut self, answer: &AnswerRow) -> StoreResult<()> {
        self.guard.answers.insert(answer.id, answer.clone());
        Ok(())
    }

    async fn insert_answer_option(&mut self, row: &AnswerOptionRow) -> StoreResult<()> {
        self.guard.answer_options.insert(row.id, row.clone());
        Ok(())
    }

    async fn response_ids_for_form(&mut self, form_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(self
            .guard
            .responses
            .values()
            .filter(|response| response.form_id == form_id)
            .map(|response| response.id)
            .collect())
    }

    async fn delete_answer_options_for_responses(&mut self, response_ids: &[Uuid]) -> StoreResult<u64> {
        let wanted = id_set(response_ids);
        let tables = &mut *self.guard;
        let answer_ids: HashSet<Uuid> = tables
            .answers
            .values()
            .filter(|answer| wanted.contains(&answer.response_id))
            .map(|answer| answer.id)
            .collect();
        let before = tables.answer_options.len();
        tables
            .answer_options
            .retain(|_, join| !answer_ids.contains(&join.answer_id));
        Ok((before - tables.answer_options.len()) as u64)
    }

    async fn delete_answers_for_responses(&mut self, response_ids: &[Uuid]) -> StoreResult<u64> {
        let wanted = id_set(response_ids);
        let before = self.guard.answers.len();
        self.guard
            .answers
            .retain(|_, answer| !wanted.contains(&answer.response_id));
        Ok((before - self.guard.answers.len()) as u64)
    }

    async fn delete_responses_for_form(&mut self, form_id: Uuid) -> StoreResult<u64> {
        let before = self.guard.responses.len();
        self.guard
            .responses
            .retain(|_, response| response.form_id != form_id);
        Ok((before - self.guard.responses.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut tx = self;
        tx.snapshot = None;
        Ok(())
    }
}
