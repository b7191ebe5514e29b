//! Note records.

use super::{new_record_id, validate_id, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Parsed note: `name` and `content` are decoded text.
///
/// `notebook_id` should reference an existing notebook, but a note whose
/// notebook is missing is still stored and returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub creator_id: String,
    pub notebook_id: String,
    pub name: String,
    /// Markdown body.
    pub content: String,
    pub public: bool,
    pub synced: bool,
}

impl Note {
    /// Creates an empty, public, not-yet-synced note with a generated id.
    pub fn new(
        creator_id: impl Into<String>,
        notebook_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let creator_id = creator_id.into();
        Self {
            id: new_record_id(&creator_id),
            creator_id,
            notebook_id: notebook_id.into(),
            name: name.into(),
            content: String::new(),
            public: true,
            synced: false,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_id("id", &self.id)?;
        validate_id("creator_id", &self.creator_id)?;
        validate_id("notebook_id", &self.notebook_id)
    }
}

/// At-rest note: `name`/`content` are byte blobs, flags are 0/1 integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNote {
    pub id: String,
    pub creator_id: String,
    pub notebook_id: String,
    pub name: Vec<u8>,
    pub content: Vec<u8>,
    pub public: i64,
    pub synced: i64,
}
