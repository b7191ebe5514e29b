//! Encrypted local-first record store for notebooks and notes.
//!
//! Text fields are persisted as byte blobs, optionally sealed through an
//! [`EncryptionHelper`] built from the key material in [`crypto`]. The
//! [`todos`] mapper turns rendered checkbox indexes back into source lines.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod todos;

pub use codec::{CodecError, EncryptionHelper, Helper, RecordCodec};
pub use config::{ConfigError, CoreConfig};
pub use crypto::{CryptoError, EcdhKeyPair, KeyKind, RsaKeyPair, SharedCipher};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, RawNote};
pub use model::notebook::{Notebook, RawNotebook};
pub use model::ModelValidationError;
pub use repo::{
    ChangeBus, ChangeEvent, Collection, LiveQuery, NoteRepository, NotebookRepository, RecordStore,
    Records, RepoError, RepoResult, SecondaryKey,
};
pub use service::note_service::NoteService;
pub use service::notebook_service::NotebookService;
pub use service::{ServiceError, ServiceResult};
pub use todos::{lex_todos, set_todo_checked, TodoLine};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
