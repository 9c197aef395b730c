//! PostgreSQL datastore
//!
//! Queries are written out by hand and rows are mapped field by field with
//! `Row::try_get`. Enum columns are stored as their uppercase tags; a tag that
//! does not parse is reported as `StoreError::Corrupt` (form access) or kept
//! as `QuestionType::Unknown` (question type).

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::{
    AnswerOptionRow, AnswerRow, Datastore, FormRow, OptionRow, QuestionRow, ResponseRow,
    StoreError, StoreResult, StoreTx,
};
use crate::backend::auth::users::User;
use crate::shared::{FormAccess, FormsFilter, QuestionType};

const FORM_COLUMNS: &str =
    r#"id, owner_id, title, description, access, created_at, updated_at"#;
const QUESTION_COLUMNS: &str = r#"id, form_id, text, type, required, "order""#;
const OPTION_COLUMNS: &str = r#"id, question_id, text, "order""#;
const ANSWER_COLUMNS: &str =
    r#"id, response_id, question_id, text_value, bool_value, number_value, date_value"#;

/// Datastore backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn form_from_row(row: &PgRow) -> StoreResult<FormRow> {
    let access: String = row.try_get("access")?;
    let access = access
        .parse::<FormAccess>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    Ok(FormRow {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        access,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn question_from_row(row: &PgRow) -> StoreResult<QuestionRow> {
    Ok(QuestionRow {
        id: row.try_get("id")?,
        form_id: row.try_get("form_id")?,
        text: row.try_get("text")?,
        question_type: QuestionType::from(row.try_get::<String, _>("type")?),
        required: row.try_get("required")?,
        order: row.try_get("order")?,
    })
}

fn option_from_row(row: &PgRow) -> StoreResult<OptionRow> {
    Ok(OptionRow {
        id: row.try_get("id")?,
        question_id: row.try_get("question_id")?,
        text: row.try_get("text")?,
        order: row.try_get("order")?,
    })
}

fn response_from_row(row: &PgRow) -> StoreResult<ResponseRow> {
    Ok(ResponseRow {
        id: row.try_get("id")?,
        form_id: row.try_get("form_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn answer_from_row(row: &PgRow) -> StoreResult<AnswerRow> {
    Ok(AnswerRow {
        id: row.try_get("id")?,
        response_id: row.try_get("response_id")?,
        question_id: row.try_get("question_id")?,
        text_value: row.try_get("text_value")?,
        bool_value: row.try_get("bool_value")?,
        number_value: row.try_get("number_value")?,
        date_value: row.try_get("date_value")?,
    })
}

fn map_rows<T>(rows: Vec<PgRow>, map: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
    rows.iter().map(map).collect()
}

#[async_trait]
impl Datastore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, display_name, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, display_name, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_form(&self, id: Uuid) -> StoreResult<Option<FormRow>> {
        let row = sqlx::query(&format!("SELECT {} FROM forms WHERE id = $1", FORM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(form_from_row).transpose()
    }

    async fn list_forms(&self, filter: &FormsFilter) -> StoreResult<Vec<FormRow>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM forms
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::text IS NULL OR access = $2)
            ORDER BY created_at DESC, id
            "#,
            FORM_COLUMNS
        ))
        .bind(filter.owner_id)
        .bind(filter.access.map(|access| access.as_str()))
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows, form_from_row)
    }

    async fn questions_for_forms(&self, form_ids: &[Uuid]) -> StoreResult<Vec<QuestionRow>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM questions WHERE form_id = ANY($1) ORDER BY "order""#,
            QUESTION_COLUMNS
        ))
        .bind(form_ids)
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows, question_from_row)
    }

    async fn questions_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<QuestionRow>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM questions WHERE id = ANY($1)",
            QUESTION_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows, question_from_row)
    }

    async fn options_for_questions(&self, question_ids: &[Uuid]) -> StoreResult<Vec<OptionRow>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM options WHERE question_id = ANY($1) ORDER BY "order""#,
            OPTION_COLUMNS
        ))
        .bind(question_ids)
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows, option_from_row)
    }

    async fn find_option(&self, id: Uuid) -> StoreResult<Option<OptionRow>> {
        let row = sqlx::query(&format!("SELECT {} FROM options WHERE id = $1", OPTION_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(option_from_row).transpose()
    }

    async fn find_response(&self, id: Uuid) -> StoreResult<Option<ResponseRow>> {
        let row = sqlx::query("SELECT id, form_id, created_at FROM form_responses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(response_from_row).transpose()
    }

    async fn responses_for_form(&self, form_id: Uuid) -> StoreResult<Vec<ResponseRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, form_id, created_at
            FROM form_responses
            WHERE form_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows, response_from_row)
    }

    async fn answers_for_responses(&self, response_ids: &[Uuid]) -> StoreResult<Vec<AnswerRow>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM answers WHERE response_id = ANY($1)",
            ANSWER_COLUMNS
        ))
        .bind(response_ids)
        .fetch_all(&self.pool)
        .await?;
        map_rows(rows, answer_from_row)
    }

    async fn selected_options(&self, answer_ids: &[Uuid]) -> StoreResult<Vec<(Uuid, OptionRow)>> {
        let rows = sqlx::query(
            r#"
            SELECT ao.answer_id, o.id, o.question_id, o.text, o."order"
            FROM answer_options ao
            JOIN options o ON o.id = ao.option_id
            WHERE ao.answer_id = ANY($1)
            "#,
        )
        .bind(answer_ids)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| -> StoreResult<(Uuid, OptionRow)> {
                Ok((row.try_get("answer_id")?, option_from_row(row)?))
            })
            .collect()
    }
}

/// Transaction over a `PgStore`; sqlx rolls it back on drop
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn find_form(&mut self, id: Uuid) -> StoreResult<Option<FormRow>> {
        let row = sqlx::query(&format!("SELECT {} FROM forms WHERE id = $1", FORM_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(form_from_row).transpose()
    }

    async fn insert_form(&mut self, form: &FormRow) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO forms (id, owner_id, title, description, access, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(form.id)
        .bind(form.owner_id)
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.access.as_str())
        .bind(form.created_at)
        .bind(form.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_form(&mut self, form: &FormRow) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE forms
            SET title = $2, description = $3, access = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(form.id)
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.access.as_str())
        .bind(form.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_form(&mut self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_question(&mut self, id: Uuid) -> StoreResult<Option<QuestionRow>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(question_from_row).transpose()
    }

    async fn questions_for_form(&mut self, form_id: Uuid) -> StoreResult<Vec<QuestionRow>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM questions WHERE form_id = $1 ORDER BY "order""#,
            QUESTION_COLUMNS
        ))
        .bind(form_id)
        .fetch_all(&mut *self.tx)
        .await?;
        map_rows(rows, question_from_row)
    }

    async fn insert_question(&mut self, question: &QuestionRow) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO questions (id, form_id, text, type, required, "order")
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(question.id)
        .bind(question.form_id)
        .bind(&question.text)
        .bind(question.question_type.as_str())
        .bind(question.required)
        .bind(question.order)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_question(&mut self, question: &QuestionRow) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE questions
            SET text = $2, type = $3, required = $4, "order" = $5
            WHERE id = $1
            "#,
        )
        .bind(question.id)
        .bind(&question.text)
        .bind(question.question_type.as_str())
        .bind(question.required)
        .bind(question.order)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_question(&mut self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_questions_for_form(&mut self, form_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM questions WHERE form_id = $1")
            .bind(form_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_option(&mut self, id: Uuid) -> StoreResult<Option<OptionRow>> {
        let row = sqlx::query(&format!("SELECT {} FROM options WHERE id = $1", OPTION_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(option_from_row).transpose()
    }

    async fn insert_option(&mut self, option: &OptionRow) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO options (id, question_id, text, "order")
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(option.id)
        .bind(option.question_id)
        .bind(&option.text)
        .bind(option.order)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_option(&mut self, option: &OptionRow) -> StoreResult<()> {
        sqlx::query(r#"UPDATE options SET text = $2, "order" = $3 WHERE id = $1"#)
            .bind(option.id)
            .bind(&option.text)
            .bind(option.order)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_option(&mut self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM options WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_options_for_question(&mut self, question_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM options WHERE question_id = $1")
            .bind(question_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_response(&mut self, response: &ResponseRow) -> StoreResult<()> {
        sqlx::query("INSERT INTO form_responses (id, form_id, created_at) VALUES ($1, $2, $3)")
            .bind(response.id)
            .bind(response.form_id)
            .bind(response.created_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_answer(&mut self, answer: &AnswerRow) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO answers ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            ANSWER_COLUMNS
        ))
        .bind(answer.id)
        .bind(answer.response_id)
        .bind(answer.question_id)
        .bind(&answer.text_value)
        .bind(answer.bool_value)
        .bind(answer.number_value)
        .bind(answer.date_value)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_answer_option(&mut self, row: &AnswerOptionRow) -> StoreResult<()> {
        sqlx::query("INSERT INTO answer_options (id, answer_id, option_id) VALUES ($1, $2, $3)")
            .bind(row.id)
            .bind(row.answer_id)
            .bind(row.option_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn response_ids_for_form(&mut self, form_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM form_responses WHERE form_id = $1")
            .bind(form_id)
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter()
            .map(|row| row.try_get("id").map_err(StoreError::from))
            .collect()
    }

    async fn delete_answer_options_for_responses(&mut self, response_ids: &[Uuid]) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM answer_options
            WHERE answer_id IN (SELECT id FROM answers WHERE response_id = ANY($1))
            "#,
        )
        .bind(response_ids)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_answers_for_responses(&mut self, response_ids: &[Uuid]) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM answers WHERE response_id = ANY($1)")
            .bind(response_ids)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_responses_for_form(&mut self, form_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM form_responses WHERE form_id = $1")
            .bind(form_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
