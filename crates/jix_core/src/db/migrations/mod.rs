//! Versioned schema for the record store.
//!
//! # Responsibility
//! - Hold the ordered list of schema generations.
//! - Move a database forward to a requested generation in one transaction.
//!
//! # Invariants
//! - Generation numbers increase by one and mirror `PRAGMA user_version`.
//! - Generation 2 normalizes legacy rows: text blobs become byte blobs and a
//!   missing `public` flag becomes `1` (plaintext).
//! - A database from a newer binary is never touched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

/// One schema generation and the SQL that produces it from its predecessor.
struct Generation {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const GENERATIONS: [Generation; 2] = [
    Generation {
        version: 1,
        name: "legacy_text_fields",
        sql: include_str!("0001_init.sql"),
    },
    Generation {
        version: 2,
        name: "binary_fields",
        sql: include_str!("0002_binary_fields.sql"),
    },
];

/// Newest schema generation this binary can produce.
pub fn latest_version() -> u32 {
    GENERATIONS[GENERATIONS.len() - 1].version
}

/// Brings `conn` to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_migrations_to(conn, latest_version())
}

/// Brings `conn` forward to `target`, never backward.
///
/// Lower targets build databases at an older generation, which is how the
/// legacy upgrade path is exercised.
pub fn apply_migrations_to(conn: &mut Connection, target: u32) -> DbResult<()> {
    let from = current_user_version(conn)?;
    if from > latest_version() {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest_version(),
        });
    }

    let pending: Vec<&Generation> = GENERATIONS
        .iter()
        .filter(|generation| generation.version > from && generation.version <= target)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for generation in pending {
        apply_generation(&tx, generation)?;
    }
    tx.commit()?;
    Ok(())
}

fn apply_generation(tx: &Transaction<'_>, generation: &Generation) -> DbResult<()> {
    tx.execute_batch(generation.sql)?;
    tx.pragma_update(None, "user_version", generation.version)?;
    info!(
        "event=db_migrate module=db status=ok version={} name={}",
        generation.version, generation.name
    );
    Ok(())
}

/// Schema generation recorded in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}
