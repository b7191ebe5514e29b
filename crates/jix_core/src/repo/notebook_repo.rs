//! Notebook persistence.
//!
//! # Invariants
//! - `put_notebook` is insert-or-replace keyed by `id`.
//! - Scans by owner use `idx_notebooks_creator_id` and are ordered by `id`.

use super::{decode_record, read_blob, Collection, RecordStore, RepoResult};
use crate::codec::{self, at_rest_helper, Helper};
use crate::model::notebook::{Notebook, RawNotebook};
use log::debug;
use rusqlite::{params, Row};

const NOTEBOOK_SELECT_SQL: &str = "SELECT
    id,
    creator_id,
    name,
    public,
    synced
FROM notebooks";

/// Repository interface for notebooks.
pub trait NotebookRepository {
    /// Encodes and upserts one notebook; returns its id.
    fn put_notebook(&self, notebook: &Notebook, helper: Helper<'_>) -> RepoResult<String>;
    /// Gets one notebook by id; `None` when it does not exist.
    fn get_notebook(&self, id: &str, helper: Helper<'_>) -> RepoResult<Option<Notebook>>;
    /// Lists notebooks owned by `creator_id`.
    ///
    /// Fails as a whole with `CodecError::MissingHelper` when a matching
    /// notebook is private and `helper` is `None`.
    fn list_notebooks_by_creator(
        &self,
        creator_id: &str,
        helper: Helper<'_>,
    ) -> RepoResult<Vec<Notebook>>;
}

impl NotebookRepository for RecordStore<'_> {
    fn put_notebook(&self, notebook: &Notebook, helper: Helper<'_>) -> RepoResult<String> {
        notebook.validate()?;
        let helper = at_rest_helper(notebook.public, helper, &notebook.id)?;
        let raw = codec::encode(notebook, helper)?;

        self.conn().execute(
            "INSERT INTO notebooks (id, creator_id, name, public, synced)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                creator_id = excluded.creator_id,
                name = excluded.name,
                public = excluded.public,
                synced = excluded.synced;",
            params![raw.id, raw.creator_id, raw.name, raw.public, raw.synced],
        )?;

        debug!(
            "event=record_put module=repo status=ok collection=notebooks id={} public={}",
            raw.id, raw.public
        );
        self.notify(Collection::Notebooks, &raw.id);
        Ok(raw.id)
    }

    fn get_notebook(&self, id: &str, helper: Helper<'_>) -> RepoResult<Option<Notebook>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{NOTEBOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => {
                let raw = parse_notebook_row(row)?;
                Ok(Some(decode_record::<Notebook>(&raw, raw.public, &raw.id, helper)?))
            }
            None => Ok(None),
        }
    }

    fn list_notebooks_by_creator(
        &self,
        creator_id: &str,
        helper: Helper<'_>,
    ) -> RepoResult<Vec<Notebook>> {
        let mut stmt = self.conn().prepare(&format!(
            "{NOTEBOOK_SELECT_SQL} WHERE creator_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([creator_id])?;
        let mut notebooks = Vec::new();
        while let Some(row) = rows.next()? {
            let raw = parse_notebook_row(row)?;
            notebooks.push(decode_record::<Notebook>(&raw, raw.public, &raw.id, helper)?);
        }
        Ok(notebooks)
    }
}

impl<R: NotebookRepository + ?Sized> NotebookRepository for &R {
    fn put_notebook(&self, notebook: &Notebook, helper: Helper<'_>) -> RepoResult<String> {
        (**self).put_notebook(notebook, helper)
    }

    fn get_notebook(&self, id: &str, helper: Helper<'_>) -> RepoResult<Option<Notebook>> {
        (**self).get_notebook(id, helper)
    }

    fn list_notebooks_by_creator(
        &self,
        creator_id: &str,
        helper: Helper<'_>,
    ) -> RepoResult<Vec<Notebook>> {
        (**self).list_notebooks_by_creator(creator_id, helper)
    }
}

fn parse_notebook_row(row: &Row<'_>) -> RepoResult<RawNotebook> {
    Ok(RawNotebook {
        id: row.get("id")?,
        creator_id: row.get("creator_id")?,
        name: read_blob(row, "name")?,
        public: row.get("public")?,
        synced: row.get("synced")?,
    })
}
