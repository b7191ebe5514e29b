//! Record store: keyed, indexed persistence for notebooks and notes.
//!
//! # Responsibility
//! - Persist raw records and expose parsed ones through the field codec.
//! - Serve point lookups, secondary-index scans and live queries.
//! - Publish a change event after every committed write.
//!
//! # Invariants
//! - `put` is one upsert statement: it is fully applied (codec included)
//!   before the next read on the same connection can observe it.
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - A public record is never passed through the encryption helper.

mod change_bus;
pub mod note_repo;
pub mod notebook_repo;

use crate::codec::{self, at_rest_helper, flag_from_int, CodecError, Helper, RecordCodec};
use crate::db::DbError;
use crate::model::note::Note;
use crate::model::notebook::Notebook;
use crate::model::ModelValidationError;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use change_bus::{ChangeBus, ChangeEvent, LiveQuery};
pub use note_repo::NoteRepository;
pub use notebook_repo::NotebookRepository;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ModelValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("invalid persisted record data: {0}")]
    InvalidData(String),
    #[error("missing required table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("change notifications are no longer available")]
    SubscriptionClosed,
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persisted entity collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Notebooks,
    Notes,
}

impl Collection {
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Notebooks => "notebooks",
            Self::Notes => "notes",
        }
    }
}

/// Secondary-index equality scans supported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryKey {
    /// `notebooks.creator_id`
    NotebookCreator(String),
    /// `notes.notebook_id`
    NoteNotebook(String),
    /// `notes.creator_id`
    NoteCreator(String),
}

impl SecondaryKey {
    pub fn collection(&self) -> Collection {
        match self {
            Self::NotebookCreator(_) => Collection::Notebooks,
            Self::NoteNotebook(_) | Self::NoteCreator(_) => Collection::Notes,
        }
    }
}

/// Decoded result of a secondary-index scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Records {
    Notebooks(Vec<Notebook>),
    Notes(Vec<Note>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Self::Notebooks(items) => items.len(),
            Self::Notes(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// SQLite-backed store for both collections.
pub struct RecordStore<'conn> {
    conn: &'conn Connection,
    bus: ChangeBus,
}

impl<'conn> RecordStore<'conn> {
    /// Constructs a store with its own change bus from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_bus(conn, ChangeBus::new())
    }

    /// Constructs a store that publishes to and observes `bus`.
    ///
    /// Handles on separate connections to the same database share
    /// notifications by sharing one bus.
    pub fn with_bus(conn: &'conn Connection, bus: ChangeBus) -> RepoResult<Self> {
        ensure_store_ready(conn)?;
        Ok(Self { conn, bus })
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Equality scan over one secondary index, decoded.
    pub fn list_by_secondary_key(
        &self,
        key: &SecondaryKey,
        helper: Helper<'_>,
    ) -> RepoResult<Records> {
        match key {
            SecondaryKey::NotebookCreator(creator_id) => self
                .list_notebooks_by_creator(creator_id, helper)
                .map(Records::Notebooks),
            SecondaryKey::NoteNotebook(notebook_id) => self
                .list_notes_by_notebook(notebook_id, helper)
                .map(Records::Notes),
            SecondaryKey::NoteCreator(creator_id) => self
                .list_notes_by_creator(creator_id, helper)
                .map(Records::Notes),
        }
    }

    /// Evaluates `query` now and again whenever a write touches one of
    /// `collections`.
    pub fn observe<'a, T>(
        &'a self,
        collections: &[Collection],
        query: impl FnMut(&RecordStore<'conn>) -> RepoResult<T> + 'a,
    ) -> RepoResult<LiveQuery<'a, RecordStore<'conn>, T>> {
        LiveQuery::start(self, &self.bus, collections, query)
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }

    pub(crate) fn notify(&self, collection: Collection, id: &str) {
        self.bus.publish(collection, id);
    }
}

/// Decodes a raw record with the helper its `public` flag calls for.
pub(crate) fn decode_record<R: RecordCodec>(
    raw: &R::Raw,
    public: i64,
    id: &str,
    helper: Helper<'_>,
) -> RepoResult<R> {
    let public = flag_from_int("public", public)?;
    let helper = at_rest_helper(public, helper, id)?;
    Ok(codec::parse(raw, helper)?)
}

/// Reads a binary column, accepting legacy text values.
pub(crate) fn read_blob(row: &Row<'_>, column: &'static str) -> RepoResult<Vec<u8>> {
    match row.get_ref(column)? {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Ok(bytes.to_vec()),
        other => Err(RepoError::InvalidData(format!(
            "expected blob in column `{column}`, found {}",
            other.data_type()
        ))),
    }
}

fn ensure_store_ready(conn: &Connection) -> RepoResult<()> {
    for collection in [Collection::Notebooks, Collection::Notes] {
        let table = collection.table_name();
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
