// src/services/coffee_service.rs
//
// Coffee Service - uniform CRUD over the active backend
//
// RULES:
// - Backend is chosen once, at construction
// - Reads fall back to the local snapshot when the remote fails, and say so
// - Writes on the remote path surface their errors; they are never
//   redirected to local storage
// - No retries; the remote client enforces its own timeout

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::domain::{generate_id, validate_entry, validate_patch, CoffeeEntry, CoffeePatch};
use crate::error::{AppError, AppResult};
use crate::repositories::{RemoteCoffeeRepository, SnapshotRepository, StorageInfo};

/// Data together with the backend that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    /// Served by the active backend
    Primary(T),
    /// Served by the local snapshot because the remote read failed
    Fallback { data: T, reason: String },
}

impl<T> Loaded<T> {
    pub fn data(&self) -> &T {
        match self {
            Loaded::Primary(data) => data,
            Loaded::Fallback { data, .. } => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Loaded::Primary(data) => data,
            Loaded::Fallback { data, .. } => data,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Loaded::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Loaded::Primary(_) => None,
            Loaded::Fallback { reason, .. } => Some(reason),
        }
    }

    /// The data, or `RemoteUnavailable` if it came from the fallback.
    /// For read-modify-write cycles that must not push stale local data upstream.
    pub fn into_primary(self) -> AppResult<T> {
        match self {
            Loaded::Primary(data) => Ok(data),
            Loaded::Fallback { reason, .. } => Err(AppError::RemoteUnavailable(reason)),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Loaded<U> {
        match self {
            Loaded::Primary(data) => Loaded::Primary(f(data)),
            Loaded::Fallback { data, reason } => Loaded::Fallback {
                data: f(data),
                reason,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub migrated: usize,
}

pub struct CoffeeService {
    local: Arc<dyn SnapshotRepository>,
    remote: Option<Arc<dyn RemoteCoffeeRepository>>,
}

impl CoffeeService {
    pub fn new(
        local: Arc<dyn SnapshotRepository>,
        remote: Option<Arc<dyn RemoteCoffeeRepository>>,
    ) -> Self {
        if remote.is_some() {
            log::info!("Coffee storage: remote backend with local read fallback");
        } else {
            log::info!("Coffee storage: local snapshot only");
        }

        Self { local, remote }
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Every entry, newest cupping first
    pub async fn list_all(&self) -> AppResult<Loaded<Vec<CoffeeEntry>>> {
        let Some(remote) = &self.remote else {
            return Ok(Loaded::Primary(self.load_local_sorted()?));
        };

        match remote.list_ordered().await {
            Ok(entries) => Ok(Loaded::Primary(entries)),
            Err(e) => {
                log::warn!("Remote read failed, serving local snapshot: {}", e);
                Ok(Loaded::Fallback {
                    data: self.load_local_sorted()?,
                    reason: e.to_string(),
                })
            }
        }
    }

    pub async fn get(&self, id: i64) -> AppResult<Loaded<CoffeeEntry>> {
        match self.list_all().await? {
            Loaded::Primary(entries) => Ok(Loaded::Primary(find_entry(entries, id)?)),
            Loaded::Fallback { data, reason } => Ok(Loaded::Fallback {
                data: find_entry(data, id)?,
                reason,
            }),
        }
    }

    pub fn storage_info(&self) -> AppResult<StorageInfo> {
        self.local.storage_info()
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Store a new entry and return it as stored
    pub async fn add(&self, entry: CoffeeEntry) -> AppResult<CoffeeEntry> {
        validate_entry(&entry)?;
        if !entry.blend_is_balanced() {
            log::warn!(
                "Entry {} blend does not add up to 100% ({} arabica, {} robusta)",
                entry.id,
                entry.percent_arabica,
                entry.percent_robusta
            );
        }

        if let Some(remote) = &self.remote {
            let stored = remote.insert(&entry).await.map_err(|e| {
                log::error!("Remote insert of entry {} failed: {}", entry.id, e);
                e
            })?;
            log::info!("Added entry {} to remote backend", stored.id);
            return Ok(stored);
        }

        let mut entries = self.local.load_all()?;
        let mut entry = entry;
        if entries.iter().any(|e| e.id == entry.id) {
            entry.id = next_free_id(&entries);
        }

        entries.push(entry.clone());
        self.local.save_all(&entries)?;

        log::info!("Added entry {} to local snapshot", entry.id);
        Ok(entry)
    }

    /// Apply a partial update; `NotFound` when no entry has that id
    pub async fn update(&self, id: i64, patch: &CoffeePatch) -> AppResult<CoffeeEntry> {
        validate_patch(patch)?;

        if let Some(remote) = &self.remote {
            return match remote.update(id, patch).await {
                Ok(Some(updated)) => Ok(updated),
                Ok(None) => Err(AppError::NotFound),
                Err(e) => {
                    log::error!("Remote update of entry {} failed: {}", id, e);
                    Err(e)
                }
            };
        }

        let mut entries = self.local.load_all()?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(AppError::NotFound)?;

        entry.apply(patch);
        validate_entry(entry)?;
        let updated = entry.clone();

        self.local.save_all(&entries)?;
        Ok(updated)
    }

    /// Delete by id; a missing id reports `NotFound` and changes nothing
    pub async fn delete(&self, id: i64) -> AppResult<DeleteOutcome> {
        if let Some(remote) = &self.remote {
            let removed = remote.delete(id).await.map_err(|e| {
                log::error!("Remote delete of entry {} failed: {}", id, e);
                e
            })?;
            return Ok(outcome(removed));
        }

        let mut entries = self.local.load_all()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() == before {
            return Ok(DeleteOutcome::NotFound);
        }

        self.local.save_all(&entries)?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Replace the whole collection
    pub async fn replace_all(&self, entries: &[CoffeeEntry]) -> AppResult<()> {
        if let Some(remote) = &self.remote {
            remote.replace_all(entries).await.map_err(|e| {
                log::error!("Remote replace of {} entries failed: {}", entries.len(), e);
                e
            })?;
            log::info!("Replaced remote collection with {} entries", entries.len());
            return Ok(());
        }

        self.local.save_all(entries)?;
        log::info!("Replaced local collection with {} entries", entries.len());
        Ok(())
    }

    /// Copy every local entry to the remote backend, overwriting rows with the same id
    pub async fn migrate_to_remote(&self) -> AppResult<MigrationReport> {
        let remote = self.remote.as_ref().ok_or(AppError::RemoteNotConfigured)?;

        let entries = self.local.load_all()?;
        let migrated = remote.upsert_all(&entries).await?;

        log::info!("Migrated {} local entries to remote backend", migrated);
        Ok(MigrationReport { migrated })
    }

    /// Delete every remote row
    pub async fn clear_remote(&self) -> AppResult<()> {
        let remote = self.remote.as_ref().ok_or(AppError::RemoteNotConfigured)?;

        remote.delete_all().await?;
        log::warn!("Cleared all entries from remote backend");
        Ok(())
    }

    /// Copy an entry as a new preparation variant
    ///
    /// The copy gets a fresh id and cupping time, with ratings, comment and
    /// preparation notes cleared. Source and copy share a coffee group; a
    /// source without one is tagged first.
    pub async fn create_variation(&self, id: i64) -> AppResult<CoffeeEntry> {
        let entries = self.list_all().await?.into_primary()?;
        let source = entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(AppError::NotFound)?;

        let group = match source.group() {
            Some(group) => group.to_string(),
            None => {
                let group = group_slug(&source.roaster, &source.description);
                let tag = CoffeePatch {
                    coffee_group: Some(Some(group.clone())),
                    ..Default::default()
                };
                self.update(id, &tag).await?;
                group
            }
        };

        let mut variation = source.clone();
        variation.id = generate_id();
        if entries.iter().any(|e| e.id == variation.id) {
            variation.id = next_free_id(&entries);
        }
        variation.cupping_time = Utc::now();
        variation.crema_rating = 0;
        variation.taste_rating = 0;
        variation.comment = None;
        variation.preparation_notes = None;
        variation.coffee_group = Some(group);

        self.add(variation).await
    }

    fn load_local_sorted(&self) -> AppResult<Vec<CoffeeEntry>> {
        let mut entries = self.local.load_all()?;
        entries.sort_by(|a, b| b.cupping_time.cmp(&a.cupping_time));
        Ok(entries)
    }
}

fn outcome(removed: bool) -> DeleteOutcome {
    if removed {
        DeleteOutcome::Deleted
    } else {
        DeleteOutcome::NotFound
    }
}

fn find_entry(entries: Vec<CoffeeEntry>, id: i64) -> AppResult<CoffeeEntry> {
    entries
        .into_iter()
        .find(|e| e.id == id)
        .ok_or(AppError::NotFound)
}

fn next_free_id(entries: &[CoffeeEntry]) -> i64 {
    entries.iter().map(|e| e.id).max().unwrap_or(0) + 1
}

/// Group tag derived from roaster and description, e.g. "lavazza-crema-e-gusto"
pub fn group_slug(roaster: &str, description: &str) -> String {
    format!("{}-{}", roaster, description)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
