// src/application/commands/coffee_commands.rs
//
// Coffee Command Handlers
//
// RULES:
// - Accept DTOs
// - Call services
// - Return DTOs
// - Never contain business logic

use std::str::FromStr;

use crate::application::{
    dto::*,
    error_handling::{CommandResult, ErrorResponse, ToErrorResponse},
    state::AppState,
};
use crate::domain::{BrewingMethod, CoffeeEntry, CoffeePatch, Currency, RoastLevel};
use crate::services::{group_by_roaster, run_query, CatalogQuery, DeleteOutcome, RoasterGroup, SortKey};

/// List entries matching the query
pub async fn list_coffees(
    state: &AppState,
    dto: ListCoffeesDto,
) -> CommandResult<LoadedDto<Vec<CoffeeDto>>> {
    let query = catalog_query(dto)?;
    let loaded = state.coffee_service.list_all().await.to_error_response()?;

    Ok(LoadedDto::from_loaded(loaded, |entries| {
        run_query(entries, &query)
            .into_iter()
            .map(CoffeeDto::from)
            .collect()
    }))
}

/// Entries matching the query, grouped by roaster and variation
pub async fn list_coffees_grouped(
    state: &AppState,
    dto: ListCoffeesDto,
) -> CommandResult<LoadedDto<Vec<RoasterGroup>>> {
    let query = catalog_query(dto)?;
    let loaded = state.coffee_service.list_all().await.to_error_response()?;

    Ok(LoadedDto::from_loaded(loaded, |entries| {
        group_by_roaster(&run_query(entries, &query))
    }))
}

/// Get a single entry by id
pub async fn get_coffee(state: &AppState, id: i64) -> CommandResult<LoadedDto<CoffeeDto>> {
    let loaded = state.coffee_service.get(id).await.to_error_response()?;
    Ok(LoadedDto::from_loaded(loaded, CoffeeDto::from))
}

/// Create a new entry
pub async fn create_coffee(state: &AppState, dto: CreateCoffeeDto) -> CommandResult<CoffeeDto> {
    let entry = entry_from_dto(dto)?;

    let stored = state.coffee_service.add(entry).await.to_error_response()?;
    Ok(CoffeeDto::from(stored))
}

/// Change some fields of an entry
pub async fn update_coffee(
    state: &AppState,
    id: i64,
    dto: UpdateCoffeeDto,
) -> CommandResult<CoffeeDto> {
    let patch = patch_from_dto(dto)?;
    if patch.is_empty() {
        return Err(ErrorResponse::validation("Nothing to update".to_string()));
    }

    let updated = state
        .coffee_service
        .update(id, &patch)
        .await
        .to_error_response()?;
    Ok(CoffeeDto::from(updated))
}

pub async fn delete_coffee(state: &AppState, id: i64) -> CommandResult<DeleteOutcome> {
    state.coffee_service.delete(id).await.to_error_response()
}

/// Copy an entry as a new preparation variant
pub async fn create_variation(state: &AppState, id: i64) -> CommandResult<CoffeeDto> {
    let variation = state
        .coffee_service
        .create_variation(id)
        .await
        .to_error_response()?;
    Ok(CoffeeDto::from(variation))
}

pub async fn storage_info(state: &AppState) -> CommandResult<StorageInfoDto> {
    let local = state.coffee_service.storage_info().to_error_response()?;
    let remote_enabled = state.coffee_service.is_remote_enabled();

    Ok(StorageInfoDto {
        backend: if remote_enabled { "remote" } else { "local" }.to_string(),
        remote_enabled,
        local,
    })
}

// ============================================================================
// INPUT PARSING
// ============================================================================

fn catalog_query(dto: ListCoffeesDto) -> CommandResult<CatalogQuery> {
    let sort = match dto.sort.as_deref() {
        Some(raw) => SortKey::from_str(raw).map_err(ErrorResponse::validation)?,
        None => SortKey::default(),
    };

    Ok(CatalogQuery {
        search: dto.search.filter(|s| !s.trim().is_empty()),
        favorites_only: dto.favorites_only,
        sort,
    })
}

fn entry_from_dto(dto: CreateCoffeeDto) -> CommandResult<CoffeeEntry> {
    let mut entry = CoffeeEntry::new(dto.roaster.trim(), dto.description.trim());

    entry.favorite = dto.favorite;
    entry.grinded = dto.grinded;
    entry.grinding_time = non_blank(dto.grinding_time);
    entry.grinding_degree = non_blank(dto.grinding_degree);
    entry.coffee_amount = non_blank(dto.coffee_amount);
    entry.servings = non_blank(dto.servings);
    if let Some(arabica) = dto.percent_arabica {
        entry.set_arabica_share(arabica);
    }
    entry.crema_rating = dto.crema_rating.unwrap_or(0);
    entry.taste_rating = dto.taste_rating.unwrap_or(0);
    entry.taste_notes = non_blank(dto.taste_notes);
    entry.url = non_blank(dto.url);
    entry.comment = non_blank(dto.comment);
    entry.origin = non_blank(dto.origin);
    entry.price = non_blank(dto.price);
    entry.preparation_notes = non_blank(dto.preparation_notes);
    entry.coffee_group = non_blank(dto.coffee_group);

    if let Some(level) = parse_choice::<RoastLevel>(dto.roast_level)? {
        entry.roast_level = level;
    }
    if let Some(method) = parse_choice::<BrewingMethod>(dto.brewing_method)? {
        entry.brewing_method = method;
    }
    if let Some(method) = parse_choice::<BrewingMethod>(dto.recommended_method)? {
        entry.recommended_method = method;
    }
    if let Some(currency) = parse_choice::<Currency>(dto.currency)? {
        entry.currency = currency;
    }
    if let Some(size) = dto.package_size {
        entry.package_size = Some(size);
    }

    Ok(entry)
}

fn patch_from_dto(dto: UpdateCoffeeDto) -> CommandResult<CoffeePatch> {
    Ok(CoffeePatch {
        roaster: dto.roaster.map(|s| s.trim().to_string()),
        description: dto.description.map(|s| s.trim().to_string()),
        favorite: dto.favorite,
        grinded: dto.grinded,
        grinding_time: text_change(dto.grinding_time),
        grinding_degree: text_change(dto.grinding_degree),
        coffee_amount: text_change(dto.coffee_amount),
        servings: text_change(dto.servings),
        percent_arabica: dto.percent_arabica,
        // robusta always follows arabica
        percent_robusta: dto.percent_arabica.map(|a| 100 - a),
        crema_rating: dto.crema_rating,
        taste_rating: dto.taste_rating,
        taste_notes: text_change(dto.taste_notes),
        url: text_change(dto.url),
        comment: text_change(dto.comment),
        origin: text_change(dto.origin),
        roast_level: parse_choice(dto.roast_level)?,
        brewing_method: parse_choice(dto.brewing_method)?,
        recommended_method: parse_choice(dto.recommended_method)?,
        price: text_change(dto.price),
        package_size: dto.package_size.map(|size| Some(size).filter(|s| *s > 0)),
        currency: parse_choice(dto.currency)?,
        preparation_notes: text_change(dto.preparation_notes),
        coffee_group: text_change(dto.coffee_group),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `None` leaves the field alone, an empty string clears it
fn text_change(value: Option<String>) -> Option<Option<String>> {
    value.map(|s| non_blank(Some(s)))
}

/// Same convention as `text_change` for enum fields; unknown values are rejected
fn parse_choice<T>(value: Option<String>) -> CommandResult<Option<Option<T>>>
where
    T: FromStr<Err = String>,
{
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(Some(None)),
        Some(raw) => T::from_str(&raw)
            .map(|v| Some(Some(v)))
            .map_err(ErrorResponse::validation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error_handling::ErrorType;

    fn create_dto(roaster: &str, description: &str) -> CreateCoffeeDto {
        CreateCoffeeDto {
            roaster: roaster.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let state = AppState::in_memory();

        let mut dto = create_dto("Lavazza - Crema e Gusto", "Classic");
        dto.price = Some("20.00".to_string());
        dto.taste_rating = Some(4);
        dto.roast_level = Some("dark".to_string());
        let created = create_coffee(&state, dto).await.unwrap();
        assert_eq!(created.entry.roast_level, Some(RoastLevel::Dark));
        assert!(created.cost.is_some());

        create_coffee(&state, create_dto("Tchibo", "Barista")).await.unwrap();

        let listed = list_coffees(
            &state,
            ListCoffeesDto {
                search: Some("lavazza".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(!listed.from_fallback);
        assert_eq!(listed.data.len(), 1);
        assert_eq!(listed.data[0].entry.id, created.entry.id);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_choice() {
        let state = AppState::in_memory();
        let mut dto = create_dto("A", "B");
        dto.brewing_method = Some("percolator".to_string());

        let error = create_coffee(&state, dto).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_roaster() {
        let state = AppState::in_memory();

        let error = create_coffee(&state, create_dto("  ", "B")).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::DomainError);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_sort() {
        let state = AppState::in_memory();
        let dto = ListCoffeesDto {
            sort: Some("popularity".to_string()),
            ..Default::default()
        };

        let error = list_coffees(&state, dto).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_update_clears_and_balances() {
        let state = AppState::in_memory();
        let mut dto = create_dto("A", "B");
        dto.comment = Some("too bitter".to_string());
        let created = create_coffee(&state, dto).await.unwrap();

        let updated = update_coffee(
            &state,
            created.entry.id,
            UpdateCoffeeDto {
                comment: Some(String::new()),
                percent_arabica: Some(70),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.entry.comment, None);
        assert_eq!(updated.entry.percent_arabica, 70);
        assert_eq!(updated.entry.percent_robusta, 30);
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let state = AppState::in_memory();

        let error = update_coffee(&state, 1, UpdateCoffeeDto::default())
            .await
            .unwrap_err();
        assert_eq!(error.error_type, ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let state = AppState::in_memory();

        let error = get_coffee(&state, 42).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(delete_coffee(&state, 42).await.unwrap(), DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_variation_and_grouping() {
        let state = AppState::in_memory();
        let created = create_coffee(&state, create_dto("DieRöster - Suchan", "Bologna"))
            .await
            .unwrap();

        let variation = create_variation(&state, created.entry.id).await.unwrap();
        assert_ne!(variation.entry.id, created.entry.id);

        let grouped = list_coffees_grouped(&state, ListCoffeesDto::default())
            .await
            .unwrap();
        assert_eq!(grouped.data.len(), 1);
        assert_eq!(grouped.data[0].name, "DieRöster");
        assert_eq!(grouped.data[0].variations.len(), 1);
        assert_eq!(grouped.data[0].entry_count(), 2);
    }

    #[tokio::test]
    async fn test_storage_info_local() {
        let state = AppState::in_memory();
        create_coffee(&state, create_dto("A", "B")).await.unwrap();

        let info = storage_info(&state).await.unwrap();

        assert_eq!(info.backend, "local");
        assert_eq!(info.local.entry_count, 1);
    }
}
