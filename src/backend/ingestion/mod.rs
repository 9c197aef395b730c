//! Response Ingestion Module
//!
//! Accepts form submissions and serves them back to the form's owner.
//!
//! # Module Structure
//!
//! ```text
//! ingestion/
//! ├── mod.rs       - Module exports and documentation
//! ├── service.rs   - Transactional submit and owner-only reads
//! ├── dto.rs       - Denormalized FormResponse assembly
//! └── handlers.rs  - HTTP handlers
//! ```
//!
//! # Answer dispatch
//!
//! The question's type decides which field of an answer is read:
//!
//! | Type | Stored value |
//! |------|--------------|
//! | `BOOLEAN` | `boolValue` |
//! | `NUMBER` | `numberValue` |
//! | `DATE` | `dateValue`, parsed as RFC 3339 |
//! | `SINGLE_CHOICE`, `MULTIPLE_CHOICE` | one join row per `optionIds` entry |
//! | anything else | `textValue` |

pub mod dto;

pub mod service;

pub mod handlers;

pub use dto::dedupe_options;
pub use service::{form_response, form_responses, submit_form_response};
