//! Shared Module
//!
//! Types and data structures shared between the server and its clients.
//! Everything here is plain serde data: the JSON field names are camelCase
//! and match the query/mutation field names clients already depend on.

/// Form, question and option definitions
pub mod forms;

/// Response submission and the denormalized response shape
pub mod responses;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use forms::{
    AnswerKind, Form, FormAccess, FormInput, FormPatch, FormsFilter, OptionInput, OptionPatch,
    Question, QuestionInput, QuestionOption, QuestionPatch, QuestionType,
};
pub use responses::{Answer, AnswerInput, AnswerValue, FormResponse, FormResponseInput, OptionRef};
