//! Form catalog and response ingestion against PostgreSQL
//!
//! Each test returns early unless `DATABASE_URL` is set. Rows are scoped by
//! freshly created users and forms, so the tests can share one database.

mod common;

use assert_matches::assert_matches;
use common::database::TestDatabase;
use formhub::backend::catalog::service::{create_form, delete_form, get_form, list_forms, update_form};
use formhub::backend::error::BackendError;
use formhub::backend::ingestion::service::{form_response, form_responses, submit_form_response};
use formhub::backend::middleware::Caller;
use formhub::shared::{
    AnswerInput, Form, FormAccess, FormInput, FormPatch, FormResponseInput, FormsFilter,
    OptionInput, QuestionInput, QuestionType,
};
use pretty_assertions::assert_eq;
use uuid::Uuid;

fn question(text: &str, question_type: QuestionType, order: i32, options: &[&str]) -> QuestionInput {
    QuestionInput {
        text: text.to_string(),
        question_type,
        required: false,
        order,
        options: options
            .iter()
            .enumerate()
            .map(|(i, text)| OptionInput {
                text: text.to_string(),
                order: i as i32,
            })
            .collect(),
    }
}

async fn survey(db: &TestDatabase, owner: &Caller) -> Form {
    let input = FormInput {
        title: "Survey".to_string(),
        description: Some("Postgres".to_string()),
        access: FormAccess::Public,
        questions: vec![
            question("When", QuestionType::Date, 2, &[]),
            question("Colour", QuestionType::MultipleChoice, 0, &["Red", "Blue"]),
            question("Age", QuestionType::Number, 1, &[]),
        ],
    };
    create_form(db.store(), owner, input).await.unwrap()
}

fn answer(question_id: Uuid) -> AnswerInput {
    AnswerInput {
        question_id,
        ..AnswerInput::default()
    }
}

#[tokio::test]
async fn test_form_tree_is_loaded_in_order() {
    let Some(db) = TestDatabase::from_env().await else { return };
    let owner = Caller::User(db.create_owner().await.id);

    let form = survey(&db, &owner).await;

    let texts: Vec<&str> = form.questions.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(texts, vec!["Colour", "Age", "When"]);
    let options: Vec<&str> = form.questions[0].options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(options, vec!["Red", "Blue"]);

    let filter = FormsFilter {
        owner_id: owner.user_id(),
        access: Some(FormAccess::Public),
    };
    let listed = list_forms(db.store(), &filter).await.unwrap();
    assert_eq!(listed, vec![form]);
}

#[tokio::test]
async fn test_submission_dedupes_selected_options() {
    let Some(db) = TestDatabase::from_env().await else { return };
    let owner = Caller::User(db.create_owner().await.id);
    let form = survey(&db, &owner).await;
    let colour = &form.questions[0];
    let red = colour.options[0].id;
    let blue = colour.options[1].id;

    let input = FormResponseInput {
        form_id: form.id,
        answers: vec![
            AnswerInput {
                option_ids: vec![red, blue, red],
                ..answer(colour.id)
            },
            AnswerInput {
                number_value: Some(7.5),
                ..answer(form.questions[1].id)
            },
            AnswerInput {
                date_value: Some("2024-05-01T10:00:00Z".to_string()),
                ..answer(form.questions[2].id)
            },
        ],
    };
    let submitted = submit_form_response(db.store(), &Caller::Anonymous, input)
        .await
        .unwrap();

    assert_eq!(submitted.answers.len(), 3);
    let mut selected: Vec<&str> = submitted.answers[0]
        .selected_options
        .iter()
        .map(|o| o.text.as_str())
        .collect();
    selected.sort_unstable();
    assert_eq!(selected, vec!["Blue", "Red"]);
    assert_eq!(submitted.answers[1].number_value, Some(7.5));
    assert!(submitted.answers[2].date_value.is_some());
    assert_eq!(db.response_rows(form.id).await, (1, 3, 3));

    let listed = form_responses(db.store(), &owner, form.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, submitted.id);
}

#[tokio::test]
async fn test_unknown_question_leaves_no_rows() {
    let Some(db) = TestDatabase::from_env().await else { return };
    let owner = Caller::User(db.create_owner().await.id);
    let form = survey(&db, &owner).await;
    let missing = Uuid::new_v4();

    let input = FormResponseInput {
        form_id: form.id,
        answers: vec![
            AnswerInput {
                option_ids: vec![form.questions[0].options[1].id],
                ..answer(form.questions[0].id)
            },
            answer(missing),
        ],
    };
    let err = submit_form_response(db.store(), &owner, input).await.unwrap_err();

    assert_eq!(err.message(), format!("question not found: {}", missing));
    assert_eq!(db.response_rows(form.id).await, (0, 0, 0));
}

#[tokio::test]
async fn test_unknown_option_leaves_no_rows() {
    let Some(db) = TestDatabase::from_env().await else { return };
    let owner = Caller::User(db.create_owner().await.id);
    let form = survey(&db, &owner).await;
    let missing = Uuid::new_v4();

    let input = FormResponseInput {
        form_id: form.id,
        answers: vec![AnswerInput {
            option_ids: vec![form.questions[0].options[0].id, missing],
            ..answer(form.questions[0].id)
        }],
    };
    let err = submit_form_response(db.store(), &owner, input).await.unwrap_err();

    assert_matches!(err, BackendError::NotFound { .. });
    assert_eq!(db.response_rows(form.id).await, (0, 0, 0));
}

#[tokio::test]
async fn test_bad_date_leaves_no_rows() {
    let Some(db) = TestDatabase::from_env().await else { return };
    let owner = Caller::User(db.create_owner().await.id);
    let form = survey(&db, &owner).await;

    let input = FormResponseInput {
        form_id: form.id,
        answers: vec![
            AnswerInput {
                number_value: Some(1.0),
                ..answer(form.questions[1].id)
            },
            AnswerInput {
                date_value: Some("tomorrow".to_string()),
                ..answer(form.questions[2].id)
            },
        ],
    };
    let err = submit_form_response(db.store(), &owner, input).await.unwrap_err();

    assert_matches!(err, BackendError::Validation { message } if message == "invalid date format: tomorrow");
    assert_eq!(db.response_rows(form.id).await, (0, 0, 0));
}

#[tokio::test]
async fn test_replacing_questions_removes_old_options() {
    let Some(db) = TestDatabase::from_env().await else { return };
    let owner = Caller::User(db.create_owner().await.id);
    let form = survey(&db, &owner).await;
    let old_option = form.questions[0].options[0].id;

    let patch = FormPatch {
        questions: Some(vec![question("Only", QuestionType::SingleChoice, 0, &["Yes"])]),
        ..FormPatch::default()
    };
    let updated = update_form(db.store(), &owner, form.id, patch).await.unwrap();

    assert_eq!(updated.questions.len(), 1);
    assert_eq!(db.catalog_rows(form.id).await, (1, 1));
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM options WHERE id = $1")
        .bind(old_option)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_delete_form_removes_responses_and_tree() {
    let Some(db) = TestDatabase::from_env().await else { return };
    let owner = Caller::User(db.create_owner().await.id);
    let form = survey(&db, &owner).await;
    let colour = &form.questions[0];

    let input = FormResponseInput {
        form_id: form.id,
        answers: vec![AnswerInput {
            option_ids: vec![colour.options[0].id, colour.options[1].id],
            ..answer(colour.id)
        }],
    };
    let submitted = submit_form_response(db.store(), &owner, input).await.unwrap();

    let stranger = Caller::User(db.create_owner().await.id);
    assert_matches!(
        delete_form(db.store(), &stranger, form.id).await,
        Err(BackendError::AccessDenied { .. })
    );

    assert!(delete_form(db.store(), &owner, form.id).await.unwrap());

    assert_eq!(db.catalog_rows(form.id).await, (0, 0));
    assert!(get_form(db.store(), form.id).await.unwrap().is_none());
    let answers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE response_id = $1")
        .bind(submitted.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(answers, 0);
    assert_matches!(
        form_response(db.store(), &owner, submitted.id).await,
        Err(BackendError::NotFound { .. })
    );
}
