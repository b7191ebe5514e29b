//! Notebook and note domain model.
//!
//! # Responsibility
//! - Define the parsed (string fields) and raw (byte fields) shape of every
//!   persisted entity.
//! - Provide record id generation and write-time validation.
//!
//! # Invariants
//! - `id` is caller-assigned, unique, and never changes after creation.
//! - `public == true` means plaintext at rest; `false` means encrypted.
//! - `synced == false` means locally modified since the last propagation.

pub mod note;
pub mod notebook;

use thiserror::Error;
use uuid::Uuid;

/// Validation failure for a record about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelValidationError {
    #[error("`{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("`{0}` must not contain whitespace")]
    WhitespaceInId(&'static str),
}

/// Generates a record id as `<creatorId>:<uuid v4>`, or a bare uuid when the
/// creator is empty.
pub fn new_record_id(creator_id: &str) -> String {
    let uuid = Uuid::new_v4();
    if creator_id.is_empty() {
        uuid.to_string()
    } else {
        format!("{creator_id}:{uuid}")
    }
}

pub(crate) fn validate_id(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    if value.is_empty() {
        return Err(ModelValidationError::EmptyField(field));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ModelValidationError::WhitespaceInId(field));
    }
    Ok(())
}
