//! Note persistence.
//!
//! # Invariants
//! - `put_note` is insert-or-replace keyed by `id`.
//! - A note whose `notebook_id` matches no notebook is stored as-is.
//! - Scans are ordered by `id` so repeated reads of unchanged data agree.

use super::{decode_record, read_blob, Collection, RecordStore, RepoError, RepoResult};
use crate::codec::{self, at_rest_helper, Helper};
use crate::model::note::{Note, RawNote};
use log::debug;
use rusqlite::{params, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    creator_id,
    notebook_id,
    name,
    content,
    public,
    synced
FROM notes";

/// Repository interface for notes.
pub trait NoteRepository {
    /// Encodes and upserts one note; returns its id.
    fn put_note(&self, note: &Note, helper: Helper<'_>) -> RepoResult<String>;
    /// Gets one note by id; `None` when it does not exist.
    fn get_note(&self, id: &str, helper: Helper<'_>) -> RepoResult<Option<Note>>;
    /// Lists notes filed under `notebook_id`.
    ///
    /// A scan is all-or-nothing: if any matching note is private and
    /// `helper` is `None`, the whole call fails with
    /// `CodecError::MissingHelper` rather than returning only the public
    /// notes. Live queries built on a scan inherit this.
    fn list_notes_by_notebook(&self, notebook_id: &str, helper: Helper<'_>)
        -> RepoResult<Vec<Note>>;
    /// Lists notes authored by `creator_id`. Same helper rule as
    /// [`Self::list_notes_by_notebook`].
    fn list_notes_by_creator(&self, creator_id: &str, helper: Helper<'_>) -> RepoResult<Vec<Note>>;
    /// Counts notes filed under `notebook_id` without decoding them.
    fn count_notes_in_notebook(&self, notebook_id: &str) -> RepoResult<u64>;
}

impl NoteRepository for RecordStore<'_> {
    fn put_note(&self, note: &Note, helper: Helper<'_>) -> RepoResult<String> {
        note.validate()?;
        let helper = at_rest_helper(note.public, helper, &note.id)?;
        let raw = codec::encode(note, helper)?;

        self.conn().execute(
            "INSERT INTO notes (id, creator_id, notebook_id, name, content, public, synced)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                creator_id = excluded.creator_id,
                notebook_id = excluded.notebook_id,
                name = excluded.name,
                content = excluded.content,
                public = excluded.public,
                synced = excluded.synced;",
            params![
                raw.id,
                raw.creator_id,
                raw.notebook_id,
                raw.name,
                raw.content,
                raw.public,
                raw.synced,
            ],
        )?;

        debug!(
            "event=record_put module=repo status=ok collection=notes id={} public={} content_bytes={}",
            raw.id,
            raw.public,
            raw.content.len()
        );
        self.notify(Collection::Notes, &raw.id);
        Ok(raw.id)
    }

    fn get_note(&self, id: &str, helper: Helper<'_>) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => {
                let raw = parse_note_row(row)?;
                Ok(Some(decode_record::<Note>(&raw, raw.public, &raw.id, helper)?))
            }
            None => Ok(None),
        }
    }

    fn list_notes_by_notebook(
        &self,
        notebook_id: &str,
        helper: Helper<'_>,
    ) -> RepoResult<Vec<Note>> {
        self.scan_notes("notebook_id", notebook_id, helper)
    }

    fn list_notes_by_creator(&self, creator_id: &str, helper: Helper<'_>) -> RepoResult<Vec<Note>> {
        self.scan_notes("creator_id", creator_id, helper)
    }

    fn count_notes_in_notebook(&self, notebook_id: &str) -> RepoResult<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM notes WHERE notebook_id = ?1;",
            [notebook_id],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative note count {count}")))
    }
}

impl<R: NoteRepository + ?Sized> NoteRepository for &R {
    fn put_note(&self, note: &Note, helper: Helper<'_>) -> RepoResult<String> {
        (**self).put_note(note, helper)
    }

    fn get_note(&self, id: &str, helper: Helper<'_>) -> RepoResult<Option<Note>> {
        (**self).get_note(id, helper)
    }

    fn list_notes_by_notebook(
        &self,
        notebook_id: &str,
        helper: Helper<'_>,
    ) -> RepoResult<Vec<Note>> {
        (**self).list_notes_by_notebook(notebook_id, helper)
    }

    fn list_notes_by_creator(&self, creator_id: &str, helper: Helper<'_>) -> RepoResult<Vec<Note>> {
        (**self).list_notes_by_creator(creator_id, helper)
    }

    fn count_notes_in_notebook(&self, notebook_id: &str) -> RepoResult<u64> {
        (**self).count_notes_in_notebook(notebook_id)
    }
}

impl RecordStore<'_> {
    fn scan_notes(
        &self,
        column: &'static str,
        value: &str,
        helper: Helper<'_>,
    ) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn().prepare(&format!(
            "{NOTE_SELECT_SQL} WHERE {column} = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([value])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let raw = parse_note_row(row)?;
            notes.push(decode_record::<Note>(&raw, raw.public, &raw.id, helper)?);
        }
        Ok(notes)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<RawNote> {
    Ok(RawNote {
        id: row.get("id")?,
        creator_id: row.get("creator_id")?,
        notebook_id: row.get("notebook_id")?,
        name: read_blob(row, "name")?,
        content: read_blob(row, "content")?,
        public: row.get("public")?,
        synced: row.get("synced")?,
    })
}
