// src/application/commands/transfer_commands.rs
//
// Export, import, reset and upgrade of the whole collection

use std::fs;
use std::path::Path;

use crate::application::{
    dto::*,
    error_handling::{CommandResult, ToErrorResponse},
    state::AppState,
};
use crate::error::AppError;
use crate::services::{parse_import, ExportDocument, ImportMode, ImportReport};

/// Export document for stdout
pub async fn export_collection(state: &AppState) -> CommandResult<LoadedDto<ExportDocument>> {
    let loaded = state.transfer_service.export().await.to_error_response()?;
    Ok(LoadedDto::from_loaded(loaded, |document| document))
}

/// Write an export document to `path`
pub async fn export_to_file(state: &AppState, path: &Path) -> CommandResult<ExportFileDto> {
    let loaded = state.transfer_service.export().await.to_error_response()?;
    let from_fallback = loaded.is_fallback();
    let document = loaded.into_data();

    let json = serde_json::to_string_pretty(&document)
        .map_err(AppError::from)
        .to_error_response()?;
    fs::write(path, json).map_err(AppError::from).to_error_response()?;

    log::info!("Exported {} entries to {}", document.coffees.len(), path.display());
    Ok(ExportFileDto {
        path: path.display().to_string(),
        entries: document.coffees.len(),
        from_fallback,
    })
}

/// Read an export file and import it
pub async fn import_from_file(
    state: &AppState,
    path: &Path,
    merge: bool,
) -> CommandResult<ImportReport> {
    let raw = fs::read_to_string(path)
        .map_err(AppError::from)
        .to_error_response()?;
    let entries = parse_import(&raw).to_error_response()?;
    let mode = if merge { ImportMode::Merge } else { ImportMode::Replace };

    state
        .transfer_service
        .import(entries, mode)
        .await
        .to_error_response()
}

pub async fn reset_collection(state: &AppState) -> CommandResult<CountDto> {
    let count = state
        .transfer_service
        .reset_to_defaults()
        .await
        .to_error_response()?;
    Ok(CountDto { count })
}

pub async fn upgrade_collection(state: &AppState) -> CommandResult<CountDto> {
    let count = state
        .transfer_service
        .upgrade_legacy_fields()
        .await
        .to_error_response()?;
    Ok(CountDto { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error_handling::ErrorType;

    #[tokio::test]
    async fn test_export_then_merge_import() {
        let state = AppState::in_memory();
        reset_collection(&state).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let exported = export_to_file(&state, &path).await.unwrap();
        assert_eq!(exported.entries, 17);
        assert!(!exported.from_fallback);

        let report = import_from_file(&state, &path, true).await.unwrap();
        assert_eq!(report.mode, ImportMode::Merge);
        assert_eq!(report.imported, 17);
        assert_eq!(report.total, 34);

        let report = import_from_file(&state, &path, false).await.unwrap();
        assert_eq!(report.total, 17);
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_file() {
        let state = AppState::in_memory();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"version\":\"1.0\"}").unwrap();

        let error = import_from_file(&state, &path, false).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let state = AppState::in_memory();
        let dir = tempfile::tempdir().unwrap();

        let error = import_from_file(&state, &dir.path().join("absent.json"), false)
            .await
            .unwrap_err();
        assert_eq!(error.error_type, ErrorType::FileSystem);
    }

    #[tokio::test]
    async fn test_export_document_shape() {
        let state = AppState::in_memory();

        let exported = export_collection(&state).await.unwrap();
        let json = serde_json::to_value(&exported.data).unwrap();

        assert_eq!(json["version"], "1.0");
        assert!(json["exportDate"].is_string());
        assert_eq!(json["coffees"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_upgrade_after_reset_changes_nothing() {
        let state = AppState::in_memory();
        reset_collection(&state).await.unwrap();

        assert_eq!(upgrade_collection(&state).await.unwrap().count, 0);
    }
}
