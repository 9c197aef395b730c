//! PostgreSQL test fixtures
//!
//! Database tests run only when `DATABASE_URL` points at a reachable
//! PostgreSQL instance; otherwise `TestDatabase::from_env` returns `None` and
//! the test returns early.

use formhub::backend::auth::users::{create_user, User};
use formhub::backend::store::PgStore;
use sqlx::PgPool;
use uuid::Uuid;

/// Run the crate's migrations against `pool`
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// A migrated database and a `PgStore` over it
pub struct TestDatabase {
    pool: PgPool,
    store: PgStore,
}

impl TestDatabase {
    /// Connect through `DATABASE_URL` and migrate, or `None` when unset
    pub async fn from_env() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };
        let pool = PgPool::connect(&url)
            .await
            .expect("Failed to create test database pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        Some(Self {
            store: PgStore::new(pool.clone()),
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn store(&self) -> &PgStore {
        &self.store
    }

    /// Insert a user with a unique email; forms need an existing owner
    pub async fn create_owner(&self) -> User {
        let email = format!("pg_{}@example.com", Uuid::new_v4());
        create_user(&self.store, &email, "Pg Owner", "hash".to_string())
            .await
            .expect("Failed to create test user")
    }

    /// Rows of each response table that belong to `form_id`
    ///
    /// Answers and join rows are matched through the form's questions and
    /// options so that a rolled-back submission is visible as zero rows.
    pub async fn response_rows(&self, form_id: Uuid) -> (i64, i64, i64) {
        let responses: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM form_responses WHERE form_id = $1")
                .bind(form_id)
                .fetch_one(&self.pool)
                .await
                .unwrap();
        let answers: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM answers WHERE question_id IN (SELECT id FROM questions WHERE form_id = $1)",
        )
        .bind(form_id)
        .fetch_one(&self.pool)
        .await
        .unwrap();
        let answer_options: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM answer_options
            WHERE option_id IN (
                SELECT o.id FROM options o JOIN questions q ON q.id = o.question_id
                WHERE q.form_id = $1
            )
            "#,
        )
        .bind(form_id)
        .fetch_one(&self.pool)
        .await
        .unwrap();
        (responses, answers, answer_options)
    }

    /// Rows still referencing `form_id` in the catalog tables
    pub async fn catalog_rows(&self, form_id: Uuid) -> (i64, i64) {
        let forms: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forms WHERE id = $1")
            .bind(form_id)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        let questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE form_id = $1")
            .bind(form_id)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        (forms, questions)
    }
}
