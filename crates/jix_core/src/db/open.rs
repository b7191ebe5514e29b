//! Connection bootstrap for the record store database.
//!
//! # Responsibility
//! - Open a file or in-memory database and bring its schema up to date.
//! - Summarize a migrated database for diagnostics.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`, a busy timeout and a
//!   fully migrated schema.
//! - File databases run in WAL mode so a reader on one connection never
//!   blocks a writer on another.

use super::migrations::{apply_migrations, current_user_version};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a connection points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    File(PathBuf),
    Memory,
}

impl OpenTarget {
    fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        match self {
            Self::File(path) => Connection::open(path),
            Self::Memory => Connection::open_in_memory(),
        }
    }
}

/// Opens (creating if needed) a database file and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_target(&OpenTarget::File(path.as_ref().to_path_buf()))
}

/// Opens a private in-memory database and migrates it.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_target(&OpenTarget::Memory)
}

/// Opens `target`, configures the connection and applies migrations.
///
/// Emits one `db_open` event with the outcome and elapsed time.
pub fn open_target(target: &OpenTarget) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = target
        .connect()
        .map_err(DbError::from)
        .and_then(|mut conn| configure(&mut conn, target).map(|()| conn));

    match &result {
        Ok(conn) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={} schema_version={}",
            target.label(),
            started_at.elapsed().as_millis(),
            current_user_version(conn).unwrap_or_default()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error={}",
            target.label(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn configure(conn: &mut Connection, target: &OpenTarget) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    if matches!(target, OpenTarget::File(_)) {
        // Returns the resulting mode as a row.
        conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get::<_, String>(0))?;
    }
    apply_migrations(conn)
}

/// Schema version and row counts of an opened database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaReport {
    pub schema_version: u32,
    pub notebooks: u64,
    pub notes: u64,
}

/// Reads [`SchemaReport`] from a migrated connection.
pub fn schema_report(conn: &Connection) -> DbResult<SchemaReport> {
    let count = |table: &str| -> DbResult<u64> {
        let rows: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))?;
        Ok(rows.max(0).unsigned_abs())
    };
    Ok(SchemaReport {
        schema_version: current_user_version(conn)?,
        notebooks: count("notebooks")?,
        notes: count("notes")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::latest_version;

    #[test]
    fn file_databases_use_wal() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db(dir.path().join("wal.sqlite3")).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn foreign_keys_are_enabled() {
        let conn = open_db_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn report_counts_rows() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO notebooks (id, creator_id, name, public, synced)
             VALUES ('nb', 'u', X'', 1, 0);
             INSERT INTO notes (id, creator_id, notebook_id, name, content, public, synced)
             VALUES ('a', 'u', 'nb', X'', X'', 1, 0), ('b', 'u', 'nb', X'', X'', 1, 0);",
        )
        .unwrap();
        assert_eq!(
            schema_report(&conn).unwrap(),
            SchemaReport {
                schema_version: latest_version(),
                notebooks: 1,
                notes: 2,
            }
        );
    }
}
