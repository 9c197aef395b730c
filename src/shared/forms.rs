//! Form Definitions
//!
//! A form is an ordered list of questions; choice questions carry an ordered
//! list of options. This module holds the materialized shapes returned to
//! clients (`Form`, `Question`, `QuestionOption`) and the input shapes used to
//! create and patch them.
//!
//! Patch types follow "absent means keep": every field is optional and only
//! the supplied ones are applied. `FormPatch::description` is a double option
//! so that an explicit `null` clears the description while an absent key keeps
//! it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Who may see and answer a form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String", into = "String")]
pub enum FormAccess {
    /// Only the owner may submit responses
    #[default]
    Private,
    /// Anyone holding the link may submit responses
    ByLink,
    /// Listed and open to everyone
    Public,
}

impl FormAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormAccess::Private => "PRIVATE",
            FormAccess::ByLink => "BY_LINK",
            FormAccess::Public => "PUBLIC",
        }
    }
}

impl FromStr for FormAccess {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PRIVATE" => Ok(FormAccess::Private),
            "BY_LINK" => Ok(FormAccess::ByLink),
            "PUBLIC" => Ok(FormAccess::Public),
            _ => Err(SharedError::unknown_variant("form access", s)),
        }
    }
}

impl TryFrom<String> for FormAccess {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormAccess> for String {
    fn from(access: FormAccess) -> Self {
        access.as_str().to_string()
    }
}

impl fmt::Display for FormAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared answer type of a question
///
/// Tags that do not name a known type are kept verbatim in `Unknown` so that
/// legacy rows survive a round trip; they are answered as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    ShortText,
    Paragraph,
    Boolean,
    Number,
    Phone,
    Date,
    Email,
    SingleChoice,
    MultipleChoice,
    Unknown(String),
}

/// Which scalar slot of an answer a question type writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    Text,
    Bool,
    Number,
    Date,
    Choice,
}

impl QuestionType {
    pub fn as_str(&self) -> &str {
        match self {
            QuestionType::ShortText => "SHORT_TEXT",
            QuestionType::Paragraph => "PARAGRAPH",
            QuestionType::Boolean => "BOOLEAN",
            QuestionType::Number => "NUMBER",
            QuestionType::Phone => "PHONE",
            QuestionType::Date => "DATE",
            QuestionType::Email => "EMAIL",
            QuestionType::SingleChoice => "SINGLE_CHOICE",
            QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
            QuestionType::Unknown(tag) => tag,
        }
    }

    pub fn answer_kind(&self) -> AnswerKind {
        match self {
            QuestionType::Boolean => AnswerKind::Bool,
            QuestionType::Number => AnswerKind::Number,
            QuestionType::Date => AnswerKind::Date,
            QuestionType::SingleChoice | QuestionType::MultipleChoice => AnswerKind::Choice,
            QuestionType::ShortText
            | QuestionType::Paragraph
            | QuestionType::Phone
            | QuestionType::Email
            | QuestionType::Unknown(_) => AnswerKind::Text,
        }
    }

    pub fn is_choice(&self) -> bool {
        self.answer_kind() == AnswerKind::Choice
    }
}

impl From<String> for QuestionType {
    fn from(tag: String) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "SHORT_TEXT" => QuestionType::ShortText,
            "PARAGRAPH" => QuestionType::Paragraph,
            "BOOLEAN" => QuestionType::Boolean,
            "NUMBER" => QuestionType::Number,
            "PHONE" => QuestionType::Phone,
            "DATE" => QuestionType::Date,
            "EMAIL" => QuestionType::Email,
            "SINGLE_CHOICE" => QuestionType::SingleChoice,
            "MULTIPLE_CHOICE" => QuestionType::MultipleChoice,
            _ => QuestionType::Unknown(tag),
        }
    }
}

impl From<&str> for QuestionType {
    fn from(tag: &str) -> Self {
        QuestionType::from(tag.to_string())
    }
}

impl From<QuestionType> for String {
    fn from(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable option of a choice question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub order: i32,
}

/// A single prompt of a form, with its options sorted by `order`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub form_id: Uuid,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub required: bool,
    pub order: i32,
    pub options: Vec<QuestionOption>,
}

/// A form with its full question/option tree, questions sorted by `order`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub access: FormAccess,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub questions: Vec<Question>,
}

/// Input for `createForm`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub access: FormAccess,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
}

/// One question of a create or full-replace payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    pub order: i32,
    #[serde(default)]
    pub options: Vec<OptionInput>,
}

/// One option of a create or full-replace payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionInput {
    pub text: String,
    pub order: i32,
}

/// Input for `updateForm`
///
/// A present `questions` list replaces every existing question of the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub access: Option<FormAccess>,
    #[serde(default)]
    pub questions: Option<Vec<QuestionInput>>,
}

/// Input for `updateQuestion`
///
/// A present `options` list replaces every existing option of the question.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPatch {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "type")]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub options: Option<Vec<OptionInput>>,
}

/// Input for `updateOption`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionPatch {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
}

/// Filters for the `forms` listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormsFilter {
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub access: Option<FormAccess>,
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_form_access_parses_any_case() {
        assert_eq!("by_link".parse::<FormAccess>().unwrap(), FormAccess::ByLink);
        assert_eq!("PUBLIC".parse::<FormAccess>().unwrap(), FormAccess::Public);
        assert_eq!(
            "secret".parse::<FormAccess>(),
            Err(SharedError::unknown_variant("form access", "secret"))
        );
    }

    #[test]
    fn test_form_access_wire_format() {
        let json = serde_json::to_string(&FormAccess::ByLink).unwrap();
        assert_eq!(json, "\"BY_LINK\"");
        let err = serde_json::from_str::<FormAccess>("\"nope\"").unwrap_err();
        assert!(err.to_string().contains("unknown form access: nope"));
    }

    #[test]
    fn test_unknown_question_type_is_kept_and_answered_as_text() {
        let question_type: QuestionType = serde_json::from_str("\"RATING\"").unwrap();
        assert_eq!(question_type, QuestionType::Unknown("RATING".to_string()));
        assert_eq!(question_type.answer_kind(), AnswerKind::Text);
        assert_eq!(serde_json::to_string(&question_type).unwrap(), "\"RATING\"");
    }

    #[test]
    fn test_question_type_kinds() {
        assert_eq!(QuestionType::from("boolean").answer_kind(), AnswerKind::Bool);
        assert_eq!(QuestionType::Number.answer_kind(), AnswerKind::Number);
        assert_eq!(QuestionType::Date.answer_kind(), AnswerKind::Date);
        assert!(QuestionType::MultipleChoice.is_choice());
        assert_eq!(QuestionType::Email.answer_kind(), AnswerKind::Text);
    }

    #[test]
    fn test_form_patch_distinguishes_null_from_absent() {
        let absent: FormPatch = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert_eq!(absent.title.as_deref(), Some("New"));
        assert_eq!(absent.description, None);

        let cleared: FormPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: FormPatch = serde_json::from_str(r#"{"description": "Hi"}"#).unwrap();
        assert_eq!(set.description, Some(Some("Hi".to_string())));
    }

    #[test]
    fn test_form_input_defaults() {
        let input: FormInput = serde_json::from_str(r#"{"title": "Survey"}"#).unwrap();
        assert_eq!(input.access, FormAccess::Private);
        assert!(input.questions.is_empty());
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_question_input_uses_type_key() {
        let input: QuestionInput = serde_json::from_str(
            r#"{"text": "Colour?", "type": "SINGLE_CHOICE", "order": 1,
                "options": [{"text": "Red", "order": 0}]}"#,
        )
        .unwrap();
        assert_eq!(input.question_type, QuestionType::SingleChoice);
        assert!(!input.required);
        assert_eq!(input.options.len(), 1);
    }
}
