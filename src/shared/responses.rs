//! Form Responses
//!
//! A response is one submission of a form: a set of answers, each bound to a
//! question. Answers are stored in a single row shape with one slot per value
//! kind; `AnswerValue` is the in-memory view of whichever slot the question's
//! type selects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::forms::Question;

/// Input for `submitFormResponse`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormResponseInput {
    pub form_id: Uuid,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

/// One answer of a submission
///
/// Only the field matching the question's type is read; the others are
/// ignored. `date_value` is the raw RFC 3339 string as sent by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: Uuid,
    #[serde(default)]
    pub text_value: Option<String>,
    #[serde(default)]
    pub bool_value: Option<bool>,
    #[serde(default)]
    pub number_value: Option<f64>,
    #[serde(default)]
    pub date_value: Option<String>,
    #[serde(default)]
    pub option_ids: Vec<Uuid>,
}

/// A selected option as embedded in an answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionRef {
    pub id: Uuid,
    pub text: String,
}

/// The typed value of an answer
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Bool(Option<bool>),
    Number(Option<f64>),
    Date(Option<DateTime<Utc>>),
    Choice(Vec<OptionRef>),
}

impl AnswerValue {
    /// Text slot; empty for every non-text value
    pub fn text_value(&self) -> &str {
        match self {
            AnswerValue::Text(text) => text,
            _ => "",
        }
    }

    pub fn bool_value(&self) -> Option<bool> {
        match self {
            AnswerValue::Bool(value) => *value,
            _ => None,
        }
    }

    pub fn number_value(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(value) => *value,
            _ => None,
        }
    }

    pub fn date_value(&self) -> Option<DateTime<Utc>> {
        match self {
            AnswerValue::Date(value) => *value,
            _ => None,
        }
    }

    pub fn selected(&self) -> &[OptionRef] {
        match self {
            AnswerValue::Choice(options) => options,
            _ => &[],
        }
    }
}

/// A denormalized answer
///
/// `question` is `None` when the question was deleted after the response was
/// submitted. `text_value` is always serialized, as an empty string when the
/// answer holds no text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub question: Option<Question>,
    #[serde(default)]
    pub text_value: String,
    pub bool_value: Option<bool>,
    pub number_value: Option<f64>,
    pub date_value: Option<DateTime<Utc>>,
    #[serde(default)]
    pub selected_options: Vec<OptionRef>,
}

/// A submitted response with its answers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: Uuid,
    pub form_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub answers: Vec<Answer>,
}
