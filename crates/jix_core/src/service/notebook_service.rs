//! Notebook use-case service.

use super::{ServiceError, ServiceResult};
use crate::codec::Helper;
use crate::model::notebook::Notebook;
use crate::repo::{NoteRepository, NotebookRepository, RepoResult};

/// Notebook service facade over repository implementations.
pub struct NotebookService<R> {
    repo: R,
}

impl<R: NotebookRepository + NoteRepository> NotebookService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a public notebook with id `<creatorId>:<uuid>`.
    pub fn create_notebook(
        &self,
        creator_id: impl Into<String>,
        name: impl Into<String>,
    ) -> ServiceResult<Notebook> {
        let notebook = Notebook::new(creator_id, name);
        let id = self.repo.put_notebook(&notebook, None)?;
        self.repo
            .get_notebook(&id, None)?
            .ok_or(ServiceError::InconsistentState(
                "created notebook not found in read-back",
            ))
    }

    pub fn rename_notebook(
        &self,
        id: &str,
        name: impl Into<String>,
        helper: Helper<'_>,
    ) -> ServiceResult<Notebook> {
        let mut notebook = self
            .repo
            .get_notebook(id, helper)?
            .ok_or_else(|| ServiceError::NotebookNotFound(id.to_string()))?;
        notebook.name = name.into();
        notebook.synced = false;
        self.repo.put_notebook(&notebook, helper)?;
        self.repo
            .get_notebook(id, helper)?
            .ok_or(ServiceError::InconsistentState(
                "renamed notebook not found in read-back",
            ))
    }

    pub fn get_notebook(&self, id: &str, helper: Helper<'_>) -> RepoResult<Option<Notebook>> {
        self.repo.get_notebook(id, helper)
    }

    pub fn list_notebooks(&self, creator_id: &str, helper: Helper<'_>) -> RepoResult<Vec<Notebook>> {
        self.repo.list_notebooks_by_creator(creator_id, helper)
    }

    /// Number of notes filed under the notebook.
    pub fn notes_count(&self, notebook_id: &str) -> RepoResult<u64> {
        self.repo.count_notes_in_notebook(notebook_id)
    }
}
