//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/save/get/list APIs for editor and viewer flows.
//! - Apply checkbox toggles from the rendered markdown back to the source.
//!
//! # Invariants
//! - `save_content` uses full content replacement semantics.
//! - A toggle rewrites exactly one line; every other byte is preserved.

use super::{ServiceError, ServiceResult};
use crate::codec::Helper;
use crate::model::note::Note;
use crate::repo::{NoteRepository, RepoResult};
use crate::todos::set_todo_checked;
use log::debug;

/// Note service facade over repository implementations.
pub struct NoteService<R> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an empty public note inside `notebook_id`.
    pub fn create_note(
        &self,
        creator_id: impl Into<String>,
        notebook_id: impl Into<String>,
        name: impl Into<String>,
    ) -> ServiceResult<Note> {
        let note = Note::new(creator_id, notebook_id, name);
        let id = self.repo.put_note(&note, None)?;
        self.read_back(&id, None, "created note not found in read-back")
    }

    /// Replaces the note body.
    pub fn save_content(
        &self,
        id: &str,
        content: impl Into<String>,
        helper: Helper<'_>,
    ) -> ServiceResult<Note> {
        let mut note = self.load(id, helper)?;
        note.content = content.into();
        note.synced = false;
        self.repo.put_note(&note, helper)?;
        self.read_back(id, helper, "saved note not found in read-back")
    }

    /// Switches the note between plaintext (`public`) and encrypted at rest.
    ///
    /// `helper` must be able to decrypt the current form and, when
    /// `public == false`, encrypt the new one.
    pub fn set_public(&self, id: &str, public: bool, helper: Helper<'_>) -> ServiceResult<Note> {
        let mut note = self.load(id, helper)?;
        note.public = public;
        note.synced = false;
        self.repo.put_note(&note, helper)?;
        self.read_back(id, helper, "re-encoded note not found in read-back")
    }

    /// Sets checkbox `index` (in rendered order) to `checked` and saves.
    pub fn toggle_todo(
        &self,
        id: &str,
        index: usize,
        checked: bool,
        helper: Helper<'_>,
    ) -> ServiceResult<Note> {
        let mut note = self.load(id, helper)?;
        note.content = set_todo_checked(&note.content, index, checked).ok_or_else(|| {
            ServiceError::TodoIndexOutOfRange {
                id: id.to_string(),
                index,
            }
        })?;
        note.synced = false;
        self.repo.put_note(&note, helper)?;
        debug!(
            "event=todo_toggle module=service status=ok id={} index={} checked={}",
            id, index, checked
        );
        self.read_back(id, helper, "toggled note not found in read-back")
    }

    pub fn get_note(&self, id: &str, helper: Helper<'_>) -> RepoResult<Option<Note>> {
        self.repo.get_note(id, helper)
    }

    pub fn list_notes(&self, notebook_id: &str, helper: Helper<'_>) -> RepoResult<Vec<Note>> {
        self.repo.list_notes_by_notebook(notebook_id, helper)
    }

    fn load(&self, id: &str, helper: Helper<'_>) -> ServiceResult<Note> {
        self.repo
            .get_note(id, helper)?
            .ok_or_else(|| ServiceError::NoteNotFound(id.to_string()))
    }

    fn read_back(&self, id: &str, helper: Helper<'_>, context: &'static str) -> ServiceResult<Note> {
        self.repo
            .get_note(id, helper)?
            .ok_or(ServiceError::InconsistentState(context))
    }
}
