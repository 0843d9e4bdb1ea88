// src/db/migrations.rs
//
// Schema setup for the local store
//
// PRINCIPLES:
// - Schema version lives in SQLite's user_version pragma
// - No automatic downgrades
// - Idempotent operations

use rusqlite::Connection;
use crate::error::{AppError, AppResult};

/// Bump together with a new step in `initialize_database`
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Version 1: one key-value table standing in for browser local storage
const KV_STORE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

/// Bring the schema up to date; safe to call on every start
pub fn initialize_database(conn: &Connection) -> AppResult<()> {
    let version = schema_version(conn)?;

    if version > CURRENT_SCHEMA_VERSION {
        return Err(AppError::Other(format!(
            "Local store schema v{} is newer than supported v{}",
            version, CURRENT_SCHEMA_VERSION
        )));
    }

    if version < 1 {
        conn.execute_batch(KV_STORE_SCHEMA)
            .map_err(|e| AppError::Other(format!("Failed to create kv_store: {}", e)))?;
        set_schema_version(conn, 1)?;
        log::info!("Initialized local store schema v1");
    }

    Ok(())
}

fn schema_version(conn: &Connection) -> AppResult<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

fn set_schema_version(conn: &Connection, version: i32) -> AppResult<()> {
    // pragmas take no bound parameters
    conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
    Ok(())
}

/// Runs SQLite's integrity check
pub fn verify_database_integrity(conn: &Connection) -> AppResult<()> {
    let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    if result != "ok" {
        return Err(AppError::Other(format!("Database integrity check failed: {}", result)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::create_test_connection;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_fresh_database_gets_kv_store() {
        let conn = create_test_connection().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        initialize_database(&conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
        assert!(table_exists(&conn, "kv_store"));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES ('k', 'v', 'now')",
            [],
        )
        .unwrap();

        initialize_database(&conn).unwrap();

        let value: String = conn
            .query_row("SELECT value FROM kv_store WHERE key = 'k'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "v");
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = create_test_connection().unwrap();
        set_schema_version(&conn, CURRENT_SCHEMA_VERSION + 1).unwrap();

        assert!(initialize_database(&conn).is_err());
    }

    #[test]
    fn test_integrity_check() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();

        verify_database_integrity(&conn).unwrap();
    }
}
