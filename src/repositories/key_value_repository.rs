// src/repositories/key_value_repository.rs
//
// Durable key-value storage backed by the `kv_store` table.
// Each key is written atomically; a batch of keys shares one transaction.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, ErrorCode, OptionalExtension};

use crate::db::{
    create_connection_pool, create_memory_pool, get_connection, initialize_database,
    verify_database_integrity, ConnectionPool,
};
use crate::error::{AppError, AppResult};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    /// Write all pairs, or none of them
    fn set_many(&self, entries: &[(&str, &str)]) -> AppResult<()>;

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.set_many(&[(key, value)])
    }
}

pub struct SqliteKeyValueStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteKeyValueStore {
    /// Wrap an existing pool; the schema must already be initialized
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Open (and initialize if needed) the store file at `db_path`
    pub fn open(db_path: &Path) -> AppResult<Self> {
        let pool = create_connection_pool(db_path)?;
        Self::initialized(pool)
    }

    /// Private in-memory store
    pub fn in_memory() -> AppResult<Self> {
        let pool = create_memory_pool()?;
        Self::initialized(pool)
    }

    pub fn verify_integrity(&self) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        verify_database_integrity(&conn)
    }

    fn initialized(pool: ConnectionPool) -> AppResult<Self> {
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
        }
        Ok(Self::new(Arc::new(pool)))
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let conn = get_connection(&self.pool)?;

        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = Utc::now().to_rfc3339();

        let tx = conn.transaction().map_err(map_write_error)?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )
            .map_err(map_write_error)?;
        }
        tx.commit().map_err(map_write_error)?;

        Ok(())
    }

}

/// A full disk is the local equivalent of an exhausted storage quota
fn map_write_error(err: rusqlite::Error) -> AppError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DiskFull) => AppError::QuotaExceeded(err.to_string()),
        _ => AppError::Database(err),
    }
}
