//! Notebook records.

use super::{new_record_id, validate_id, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Parsed notebook: `name` is decoded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: String,
    /// Owner identity; secondary index key.
    pub creator_id: String,
    pub name: String,
    pub public: bool,
    pub synced: bool,
}

impl Notebook {
    /// Creates a public, not-yet-synced notebook with a generated id.
    pub fn new(creator_id: impl Into<String>, name: impl Into<String>) -> Self {
        let creator_id = creator_id.into();
        Self::with_id(new_record_id(&creator_id), creator_id, name)
    }

    /// Creates a notebook with a caller-provided id.
    pub fn with_id(
        id: impl Into<String>,
        creator_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            creator_id: creator_id.into(),
            name: name.into(),
            public: true,
            synced: false,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_id("id", &self.id)?;
        validate_id("creator_id", &self.creator_id)
    }
}

/// At-rest notebook: `name` is a byte blob, flags are 0/1 integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotebook {
    pub id: String,
    pub creator_id: String,
    pub name: Vec<u8>,
    pub public: i64,
    pub synced: i64,
}
