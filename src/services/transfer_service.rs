// src/services/transfer_service.rs
//
// Transfer Service - export, import, reset and legacy upgrade
//
// RULES:
// - Import files are validated before anything is written
// - Every write goes through CoffeeService::replace_all
// - Read-modify-write cycles refuse to run on fallback data

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{generate_id, BrewingMethod, CoffeeEntry, Currency};
use crate::error::{AppError, AppResult};
use crate::services::{CoffeeService, Loaded};

pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Preparation note given to legacy entries cupped before the variant feature existed
pub const LEGACY_PREPARATION_NOTE: &str = "Pure espresso";

const DEFAULT_COLLECTION: &str = include_str!("default_collection.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub coffees: Vec<CoffeeEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Imported entries become the whole collection
    Replace,
    /// Imported entries are appended with fresh ids
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub mode: ImportMode,
    pub imported: usize,
    pub total: usize,
}

pub struct TransferService {
    coffee_service: Arc<CoffeeService>,
}

impl TransferService {
    pub fn new(coffee_service: Arc<CoffeeService>) -> Self {
        Self { coffee_service }
    }

    pub async fn export(&self) -> AppResult<Loaded<ExportDocument>> {
        let loaded = self.coffee_service.list_all().await?;
        Ok(loaded.map(export_document))
    }

    pub async fn import(&self, imported: Vec<CoffeeEntry>, mode: ImportMode) -> AppResult<ImportReport> {
        let count = imported.len();

        let collection = match mode {
            ImportMode::Replace => assign_unique_ids(imported),
            ImportMode::Merge => {
                let current = self.coffee_service.list_all().await?.into_primary()?;
                merge_entries(current, imported)
            }
        };

        self.coffee_service.replace_all(&collection).await?;
        log::info!("Imported {} entries ({:?}), collection now {}", count, mode, collection.len());

        Ok(ImportReport {
            mode,
            imported: count,
            total: collection.len(),
        })
    }

    /// Replace everything with the bundled sample collection
    pub async fn reset_to_defaults(&self) -> AppResult<usize> {
        let defaults = default_collection()?;
        self.coffee_service.replace_all(&defaults).await?;

        log::warn!("Collection reset to {} default entries", defaults.len());
        Ok(defaults.len())
    }

    /// Fill fields added after the first data version; returns how many entries changed
    pub async fn upgrade_legacy_fields(&self) -> AppResult<usize> {
        let mut entries = self.coffee_service.list_all().await?.into_primary()?;

        let changed = entries
            .iter_mut()
            .map(upgrade_entry)
            .filter(|changed| *changed)
            .count();

        if changed > 0 {
            self.coffee_service.replace_all(&entries).await?;
        }

        log::info!("Upgraded {} of {} entries", changed, entries.len());
        Ok(changed)
    }
}

pub fn export_document(coffees: Vec<CoffeeEntry>) -> ExportDocument {
    ExportDocument {
        version: EXPORT_FORMAT_VERSION.to_string(),
        export_date: Utc::now(),
        coffees,
    }
}

/// Parse an export file
///
/// Only `coffees` is required. Entries without a usable integer id get a
/// fresh one.
pub fn parse_import(raw: &str) -> AppResult<Vec<CoffeeEntry>> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::InvalidImport(format!("not valid JSON: {}", e)))?;

    let coffees = document
        .get("coffees")
        .ok_or_else(|| AppError::InvalidImport("missing 'coffees'".to_string()))?
        .as_array()
        .ok_or_else(|| AppError::InvalidImport("'coffees' must be an array".to_string()))?;

    let first_fresh_id = generate_id();
    coffees
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut fields = item
                .as_object()
                .cloned()
                .ok_or_else(|| AppError::InvalidImport(format!("entry {} is not an object", index)))?;

            let id = fields
                .remove("id")
                .and_then(|id| id.as_i64())
                .filter(|id| *id != 0)
                .unwrap_or(first_fresh_id + index as i64);

            let mut entry: CoffeeEntry = serde_json::from_value(Value::Object(fields))
                .map_err(|e| AppError::InvalidImport(format!("entry {}: {}", index, e)))?;
            entry.id = id;
            Ok(entry)
        })
        .collect()
}

/// Append `imported` to `current`, renumbering imported ids after the current maximum
pub fn merge_entries(mut current: Vec<CoffeeEntry>, imported: Vec<CoffeeEntry>) -> Vec<CoffeeEntry> {
    let max_id = current.iter().map(|e| e.id).max().unwrap_or(0).max(0);

    current.extend(imported.into_iter().enumerate().map(|(index, mut entry)| {
        entry.id = max_id + index as i64 + 1;
        entry
    }));
    current
}

/// Keep the first entry of each id; later repeats get ids after the maximum
pub fn assign_unique_ids(mut entries: Vec<CoffeeEntry>) -> Vec<CoffeeEntry> {
    let mut next_id = entries.iter().map(|e| e.id).max().unwrap_or(0).max(0) + 1;
    let mut seen = HashSet::with_capacity(entries.len());

    for entry in entries.iter_mut() {
        if !seen.insert(entry.id) {
            log::warn!("Duplicate id {} in import, renumbered to {}", entry.id, next_id);
            entry.id = next_id;
            seen.insert(next_id);
            next_id += 1;
        }
    }
    entries
}

pub fn default_collection() -> AppResult<Vec<CoffeeEntry>> {
    Ok(serde_json::from_str(DEFAULT_COLLECTION)?)
}

/// Fill missing fields with the values older versions implied; true if anything changed
pub fn upgrade_entry(entry: &mut CoffeeEntry) -> bool {
    let before = entry.clone();

    entry.brewing_method.get_or_insert(BrewingMethod::Espresso);
    entry.recommended_method.get_or_insert(BrewingMethod::Espresso);
    entry.currency.get_or_insert(Currency::Eur);
    if entry.package_size.unwrap_or(0) == 0 {
        entry.package_size = Some(1000);
    }

    let has_notes = entry
        .preparation_notes
        .as_deref()
        .is_some_and(|n| !n.trim().is_empty());
    if !has_notes && entry.cupping_time < legacy_cutoff() {
        entry.preparation_notes = Some(LEGACY_PREPARATION_NOTE.to_string());
    }

    *entry != before
}

fn legacy_cutoff() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2024, 12, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::DeleteOutcome;
    use crate::repositories::{LocalSnapshotRepository, SnapshotRepository, SqliteKeyValueStore};
    use serde_json::json;

    fn service_with(entries: &[CoffeeEntry]) -> (TransferService, Arc<LocalSnapshotRepository>) {
        let store = SqliteKeyValueStore::in_memory().unwrap();
        let local = Arc::new(LocalSnapshotRepository::new(Arc::new(store)));
        local.save_all(entries).unwrap();
        let coffee_service = Arc::new(CoffeeService::new(local.clone(), None));
        (TransferService::new(coffee_service), local)
    }

    fn entry(id: i64) -> CoffeeEntry {
        let mut entry = CoffeeEntry::new("Roaster", format!("Beans {}", id));
        entry.id = id;
        entry
    }

    #[test]
    fn test_parse_import_requires_coffees_array() {
        assert!(matches!(parse_import("not json"), Err(AppError::InvalidImport(_))));
        assert!(matches!(parse_import("{\"version\":\"1.0\"}"), Err(AppError::InvalidImport(_))));
        assert!(matches!(parse_import("{\"coffees\":{}}"), Err(AppError::InvalidImport(_))));
        assert!(matches!(parse_import("{\"coffees\":[42]}"), Err(AppError::InvalidImport(_))));
        assert_eq!(parse_import("{\"coffees\":[]}").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_import_assigns_missing_ids() {
        let raw = json!({
            "version": "1.0",
            "exportDate": "2024-06-01T10:00:00.000Z",
            "coffees": [
                { "id": 17, "roaster": "A", "description": "x" },
                { "roaster": "B", "description": "y" },
                { "id": 1718000000000.42, "roaster": "C", "description": "z" }
            ]
        })
        .to_string();

        let entries = parse_import(&raw).unwrap();

        assert_eq!(entries[0].id, 17);
        assert!(entries[1].id > 17);
        assert_ne!(entries[1].id, entries[2].id);
        assert_eq!(entries[2].roaster, "C");
    }

    #[test]
    fn test_export_parses_back() {
        let document = export_document(vec![entry(1), entry(2)]);
        let raw = serde_json::to_string(&document).unwrap();

        assert_eq!(document.version, EXPORT_FORMAT_VERSION);
        assert!(raw.contains("\"exportDate\""));
        assert_eq!(parse_import(&raw).unwrap(), document.coffees);
    }

    #[test]
    fn test_merge_renumbers_after_max_id() {
        let merged = merge_entries(vec![entry(100), entry(7)], vec![entry(1), entry(2), entry(100)]);
        let ids: Vec<i64> = merged.iter().map(|e| e.id).collect();

        assert_eq!(ids, vec![100, 7, 101, 102, 103]);
    }

    #[test]
    fn test_assign_unique_ids_renumbers_repeats() {
        let entries = assign_unique_ids(vec![entry(5), entry(5), entry(3), entry(3), entry(6)]);
        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();

        assert_eq!(ids, vec![5, 7, 3, 8, 6]);
        assert_eq!(entries[1].description, "Beans 5");
    }

    #[test]
    fn test_default_collection_loads() {
        let defaults = default_collection().unwrap();

        assert_eq!(defaults.len(), 17);
        assert!(defaults.iter().all(|e| !e.roaster.is_empty()));
        assert!(defaults.iter().all(|e| e.roast_level.is_some()));
    }

    #[test]
    fn test_upgrade_entry_fills_legacy_fields() {
        let mut old = entry(1);
        old.brewing_method = None;
        old.recommended_method = None;
        old.package_size = None;
        old.currency = None;
        old.cupping_time = "2023-03-15T21:48:47Z".parse().unwrap();

        assert!(upgrade_entry(&mut old));
        assert_eq!(old.brewing_method, Some(BrewingMethod::Espresso));
        assert_eq!(old.package_size, Some(1000));
        assert_eq!(old.currency, Some(Currency::Eur));
        assert_eq!(old.preparation_notes.as_deref(), Some(LEGACY_PREPARATION_NOTE));
        assert!(!upgrade_entry(&mut old));

        let mut recent = entry(2);
        recent.cupping_time = "2025-01-05T08:00:00Z".parse().unwrap();
        assert!(!upgrade_entry(&mut recent));
        assert_eq!(recent.preparation_notes, None);
    }

    #[tokio::test]
    async fn test_merge_import_into_collection() {
        let (service, local) = service_with(&[entry(100), entry(50)]);

        let report = service
            .import(vec![entry(1), entry(2), entry(3)], ImportMode::Merge)
            .await
            .unwrap();

        assert_eq!(report.imported, 3);
        assert_eq!(report.total, 5);
        let mut ids: Vec<i64> = local.load_all().unwrap().iter().map(|e| e.id).collect();
        ids.sort();
        assert_eq!(ids, vec![50, 100, 101, 102, 103]);
    }

    #[tokio::test]
    async fn test_replace_import_overwrites_collection() {
        let (service, local) = service_with(&[entry(100), entry(50)]);

        let report = service.import(vec![entry(1)], ImportMode::Replace).await.unwrap();

        assert_eq!(report.total, 1);
        let stored = local.load_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, 1);
    }

    #[tokio::test]
    async fn test_replace_import_with_repeated_ids_keeps_entries_distinct() {
        let (service, local) = service_with(&[entry(100)]);
        let raw = json!({
            "coffees": [
                { "id": 5, "roaster": "A", "description": "first" },
                { "id": 5, "roaster": "B", "description": "second" }
            ]
        })
        .to_string();

        let report = service
            .import(parse_import(&raw).unwrap(), ImportMode::Replace)
            .await
            .unwrap();
        assert_eq!(report.total, 2);

        let coffee_service = &service.coffee_service;
        assert_eq!(coffee_service.delete(5).await.unwrap(), DeleteOutcome::Deleted);

        let stored = local.load_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].description, "second");
        assert_eq!(stored[0].id, 6);
    }

    #[tokio::test]
    async fn test_failed_reset_keeps_existing_collection() {
        let store = SqliteKeyValueStore::in_memory().unwrap();
        let local = Arc::new(LocalSnapshotRepository::with_quota(Arc::new(store), 2000));
        local.save_all(&[entry(1)]).unwrap();
        let coffee_service = Arc::new(CoffeeService::new(local.clone(), None));
        let service = TransferService::new(coffee_service);

        let err = service.reset_to_defaults().await.unwrap_err();

        assert!(err.is_quota_exceeded());
        let stored = local.load_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, 1);
        assert!(local.storage_info().unwrap().version.is_some());
    }

    #[tokio::test]
    async fn test_reset_and_upgrade() {
        let (service, local) = service_with(&[entry(1)]);

        assert_eq!(service.reset_to_defaults().await.unwrap(), 17);
        assert_eq!(local.load_all().unwrap().len(), 17);

        // defaults already carry every upgraded field
        assert_eq!(service.upgrade_legacy_fields().await.unwrap(), 0);
    }
}
