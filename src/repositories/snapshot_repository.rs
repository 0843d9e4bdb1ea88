// src/repositories/snapshot_repository.rs
//
// Local snapshot of the whole collection
//
// The collection is one JSON array under a single key. A version marker and
// a last-saved timestamp sit next to it for diagnostics; neither gates reads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::CoffeeEntry;
use crate::error::{AppError, AppResult};
use crate::repositories::KeyValueStore;

pub const STORAGE_KEY: &str = "coffeeTrackerData";
pub const VERSION_KEY: &str = "coffeeTrackerVersion";
pub const LAST_SAVED_KEY: &str = "coffeeTrackerLastSaved";
pub const CURRENT_VERSION: &str = "v2.1";

/// Same order of magnitude as a browser's local storage allowance
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Diagnostic view of the local snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub version: Option<String>,
    pub last_saved: Option<DateTime<Utc>>,
    pub size_bytes: usize,
    pub entry_count: usize,
}

pub trait SnapshotRepository: Send + Sync {
    /// Every stored entry in stored order; a malformed snapshot reads as empty
    fn load_all(&self) -> AppResult<Vec<CoffeeEntry>>;
    /// Rewrite the snapshot and its markers
    fn save_all(&self, entries: &[CoffeeEntry]) -> AppResult<()>;
    fn storage_info(&self) -> AppResult<StorageInfo>;
}

pub struct LocalSnapshotRepository {
    store: Arc<dyn KeyValueStore>,
    quota_bytes: usize,
}

impl LocalSnapshotRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_quota(store, DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(store: Arc<dyn KeyValueStore>, quota_bytes: usize) -> Self {
        Self { store, quota_bytes }
    }

    fn parse_snapshot(raw: &str) -> Vec<CoffeeEntry> {
        match serde_json::from_str::<Vec<CoffeeEntry>>(raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Local snapshot is malformed, reading it as empty: {}", e);
                Vec::new()
            }
        }
    }
}

impl SnapshotRepository for LocalSnapshotRepository {
    fn load_all(&self) -> AppResult<Vec<CoffeeEntry>> {
        Ok(self
            .store
            .get(STORAGE_KEY)?
            .map(|raw| Self::parse_snapshot(&raw))
            .unwrap_or_default())
    }

    fn save_all(&self, entries: &[CoffeeEntry]) -> AppResult<()> {
        let data = serde_json::to_string(entries)?;

        if data.len() > self.quota_bytes {
            return Err(AppError::QuotaExceeded(format!(
                "snapshot needs {} bytes, limit is {} bytes",
                data.len(),
                self.quota_bytes
            )));
        }

        let saved_at = Utc::now().to_rfc3339();
        self.store.set_many(&[
            (STORAGE_KEY, data.as_str()),
            (VERSION_KEY, CURRENT_VERSION),
            (LAST_SAVED_KEY, saved_at.as_str()),
        ])?;

        log::debug!("Saved {} entries to local snapshot ({} bytes)", entries.len(), data.len());
        Ok(())
    }

    fn storage_info(&self) -> AppResult<StorageInfo> {
        let data = self.store.get(STORAGE_KEY)?;
        let version = self.store.get(VERSION_KEY)?;
        let last_saved = self
            .store
            .get(LAST_SAVED_KEY)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let (size_bytes, entry_count) = match &data {
            Some(raw) => (raw.len(), Self::parse_snapshot(raw).len()),
            None => (0, 0),
        };

        Ok(StorageInfo {
            version,
            last_saved,
            size_bytes,
            entry_count,
        })
    }
}
