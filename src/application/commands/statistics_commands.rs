// src/application/commands/statistics_commands.rs

use crate::application::{
    dto::LoadedDto,
    error_handling::{CommandResult, ToErrorResponse},
    state::AppState,
};
use crate::domain::CollectionStatistics;

/// Get statistics over the whole collection
pub async fn get_statistics(state: &AppState) -> CommandResult<LoadedDto<CollectionStatistics>> {
    let stats = state
        .statistics_service
        .collection_statistics()
        .await
        .to_error_response()?;

    Ok(LoadedDto::from_loaded(stats, |s| s))
}
