//! Form Catalog Module
//!
//! Owns form, question and option definitions.
//!
//! # Module Structure
//!
//! ```text
//! catalog/
//! ├── mod.rs       - Module exports and documentation
//! ├── loader.rs    - Eager loading of form/question/option trees
//! ├── service.rs   - Create, update, delete and read operations
//! └── handlers.rs  - HTTP handlers
//! ```
//!
//! # Ownership
//!
//! Only a form's owner may change or delete it, its questions or its options.
//! Questions are checked through their form, options through their question
//! and then the form.
//!
//! # Replacement semantics
//!
//! Updating a form with a `questions` list, or a question with an `options`
//! list, deletes the existing children and inserts the new ones with fresh
//! ids.

/// Tree loading
pub mod loader;

/// Catalog operations
pub mod service;

/// HTTP handlers
pub mod handlers;

pub use service::{
    create_form, delete_form, delete_option, delete_question, get_form, list_forms, update_form,
    update_option, update_question,
};
