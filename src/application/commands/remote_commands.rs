// src/application/commands/remote_commands.rs
//
// Remote backend maintenance
//
// RULES:
// - Clearing the remote table needs a verified PIN in the same session

use crate::application::{
    dto::PinStatusDto,
    error_handling::{CommandResult, ToErrorResponse},
    state::AppState,
};
use crate::error::AppError;
use crate::services::MigrationReport;

/// Copy the local snapshot into the remote table
pub async fn migrate_to_remote(state: &AppState) -> CommandResult<MigrationReport> {
    state
        .coffee_service
        .migrate_to_remote()
        .await
        .to_error_response()
}

pub async fn verify_pin(state: &AppState, pin: &str) -> CommandResult<PinStatusDto> {
    state.pin_service.verify_pin(pin).await.to_error_response()?;
    Ok(PinStatusDto {
        verified: state.pin_service.is_session_valid(),
    })
}

/// Delete every remote entry after verifying `pin`
pub async fn clear_remote(state: &AppState, pin: &str) -> CommandResult<()> {
    verify_pin(state, pin).await?;
    require_verified_session(state)?;

    let result = state.coffee_service.clear_remote().await;
    state.pin_service.clear_session();
    result.to_error_response()
}

/// Fails unless the current session passed PIN verification
pub fn require_verified_session(state: &AppState) -> CommandResult<()> {
    if state.pin_service.is_session_valid() {
        Ok(())
    } else {
        Err(AppError::AccessDenied("PIN not verified".to_string())).to_error_response()
    }
}
