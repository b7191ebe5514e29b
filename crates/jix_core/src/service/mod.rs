//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the form/viewer use-cases.
//! - Keep UI layers decoupled from storage and codec details.
//!
//! # Invariants
//! - Every service write marks the record as locally modified
//!   (`synced = false`).
//! - Writes are followed by a read-back through the codec.

pub mod note_service;
pub mod notebook_service;

use crate::repo::RepoError;
use thiserror::Error;

/// Service error for notebook/note use-cases.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("notebook not found: {0}")]
    NotebookNotFound(String),
    #[error("note not found: {0}")]
    NoteNotFound(String),
    #[error("note {id} has no checkbox at index {index}")]
    TodoIndexOutOfRange { id: String, index: usize },
    #[error(transparent)]
    Repo(#[from] RepoError),
    /// Internal consistency mismatch between write and read-back.
    #[error("inconsistent record state: {0}")]
    InconsistentState(&'static str),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
