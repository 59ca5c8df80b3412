//! Schema bootstrap for the parcel database.
//!
//! # Responsibility
//! - Create the `parcel` table on fresh databases.
//! - Refuse databases written by a newer schema.
//!
//! # Invariants
//! - Bootstrap SQL is idempotent (`IF NOT EXISTS`) and never drops data.
//! - Applied schema version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("0001_parcel.sql");

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Creates missing schema objects on the provided connection.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    if current_version < SCHEMA_VERSION {
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
