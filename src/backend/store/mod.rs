//! Persistence Module
//!
//! All reads and writes of forms, responses and users go through the
//! [`Datastore`] trait. Mutations are grouped in a [`StoreTx`] obtained from
//! [`Datastore::begin`]; nothing written through a transaction is visible
//! until [`StoreTx::commit`] succeeds, and dropping the transaction without
//! committing discards every write made through it.
//!
//! # Implementations
//!
//! - **`postgres`** - `PgStore`, backed by a `sqlx::PgPool`
//! - **`memory`** - `MemoryStore`, a process-local store used when no
//!   `DATABASE_URL` is configured and by the test suites
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs      - Traits, row types and StoreError
//! ├── memory.rs   - In-memory implementation
//! └── postgres.rs - PostgreSQL implementation
//! ```
//!
//! # Transactions and reads
//!
//! Reads on `Datastore` run outside any transaction. The in-memory store
//! serializes transactions behind one lock, so code holding an open `StoreTx`
//! must read through the transaction rather than the store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::shared::{FormAccess, FormsFilter, QuestionType};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Any error reported by the database driver
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// A uniqueness constraint was violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value could not be decoded into the model
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A stored form, without its questions
#[derive(Debug, Clone, PartialEq)]
pub struct FormRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub access: FormAccess,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRow {
    pub id: Uuid,
    pub form_id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    pub required: bool,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionRow {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRow {
    pub id: Uuid,
    pub form_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A stored answer
///
/// `question_id` is not a foreign key: answers outlive the question they
/// answered.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRow {
    pub id: Uuid,
    pub response_id: Uuid,
    pub question_id: Uuid,
    pub text_value: String,
    pub bool_value: Option<bool>,
    pub number_value: Option<f64>,
    pub date_value: Option<DateTime<Utc>>,
}

/// Join row between a choice answer and one selected option
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOptionRow {
    pub id: Uuid,
    pub answer_id: Uuid,
    pub option_id: Uuid,
}

/// Read access and transaction factory
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Open a new transaction
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    /// Insert a user; a duplicate email yields `StoreError::Conflict`
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_form(&self, id: Uuid) -> StoreResult<Option<FormRow>>;

    /// Forms matching every present filter field, newest first
    async fn list_forms(&self, filter: &FormsFilter) -> StoreResult<Vec<FormRow>>;

    async fn questions_for_forms(&self, form_ids: &[Uuid]) -> StoreResult<Vec<QuestionRow>>;

    async fn questions_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<QuestionRow>>;

    async fn options_for_questions(&self, question_ids: &[Uuid]) -> StoreResult<Vec<OptionRow>>;

    async fn find_option(&self, id: Uuid) -> StoreResult<Option<OptionRow>>;

    async fn find_response(&self, id: Uuid) -> StoreResult<Option<ResponseRow>>;

    /// Responses of a form, newest first
    async fn responses_for_form(&self, form_id: Uuid) -> StoreResult<Vec<ResponseRow>>;

    async fn answers_for_responses(&self, response_ids: &[Uuid]) -> StoreResult<Vec<AnswerRow>>;

    /// Options selected by the given answers as `(answer_id, option)` pairs
    ///
    /// One pair per join row, so an option selected twice appears twice.
    /// Join rows whose option no longer exists are skipped.
    async fn selected_options(&self, answer_ids: &[Uuid]) -> StoreResult<Vec<(Uuid, OptionRow)>>;
}

/// A unit of work over the store
///
/// Dropping a `StoreTx` without calling `commit` rolls it back.
#[async_trait]
pub trait StoreTx: Send {
    async fn find_form(&mut self, id: Uuid) -> StoreResult<Option<FormRow>>;

    async fn insert_form(&mut self, form: &FormRow) -> StoreResult<()>;

    async fn update_form(&mut self, form: &FormRow) -> StoreResult<()>;

    async fn delete_form(&mut self, id: Uuid) -> StoreResult<()>;

    async fn find_question(&mut self, id: Uuid) -> StoreResult<Option<QuestionRow>>;

    async fn questions_for_form(&mut self, form_id: Uuid) -> StoreResult<Vec<QuestionRow>>;

    async fn insert_question(&mut self, question: &QuestionRow) -> StoreResult<()>;

    async fn update_question(&mut self, question: &QuestionRow) -> StoreResult<()>;

    async fn delete_question(&mut self, id: Uuid) -> StoreResult<()>;

    /// Returns the number of deleted rows
    async fn delete_questions_for_form(&mut self, form_id: Uuid) -> StoreResult<u64>;

    async fn find_option(&mut self, id: Uuid) -> StoreResult<Option<OptionRow>>;

    async fn insert_option(&mut self, option: &OptionRow) -> StoreResult<()>;

    async fn update_option(&mut self, option: &OptionRow) -> StoreResult<()>;

    async fn delete_option(&mut self, id: Uuid) -> StoreResult<()>;

    /// Returns the number of deleted rows
    async fn delete_options_for_question(&mut self, question_id: Uuid) -> StoreResult<u64>;

    async fn insert_response(&mut self, response: &ResponseRow) -> StoreResult<()>;

    async fn insert_answer(&mut self, answer: &AnswerRow) -> StoreResult<()>;

    async fn insert_answer_option(&mut self, row: &AnswerOptionRow) -> StoreResult<()>;

    async fn response_ids_for_form(&mut self, form_id: Uuid) -> StoreResult<Vec<Uuid>>;

    async fn delete_answer_options_for_responses(&mut self, response_ids: &[Uuid]) -> StoreResult<u64>;

    async fn delete_answers_for_responses(&mut self, response_ids: &[Uuid]) -> StoreResult<u64>;

    async fn delete_responses_for_form(&mut self, form_id: Uuid) -> StoreResult<u64>;

    /// Make every write of this transaction visible
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
