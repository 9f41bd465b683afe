//! Board schema versions.
//!
//! Step `n` in `STEPS` brings a database from `user_version = n` to `n + 1`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const STEPS: &[&str] = &[include_str!("sql/0001_kv_store.sql")];

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = STEPS.len() as u32;

/// Reads the schema version recorded in the file.
pub fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Runs the missing steps inside one transaction.
pub fn upgrade(conn: &mut Connection) -> DbResult<()> {
    let found = stored_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    let pending = &STEPS[found as usize..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for sql in pending {
        tx.execute_batch(sql)?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    info!("event=db_schema module=db status=ok from={found} to={SCHEMA_VERSION}");
    Ok(())
}
