// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are output-friendly representations
// - DTOs carry raw user input; parsing happens in the commands
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use serde::{Deserialize, Serialize};

use crate::domain::{cost_breakdown, value_score, CoffeeEntry, CostBreakdown, TasteProfile};
use crate::repositories::StorageInfo;
use crate::services::Loaded;

// ============================================================================
// COFFEE DTOs
// ============================================================================

/// An entry together with the figures derived from it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeDto {
    #[serde(flatten)]
    pub entry: CoffeeEntry,
    pub main_roaster: String,
    /// Absent unless price and package size are known
    pub cost: Option<CostBreakdown>,
    pub value_score: Option<f64>,
    pub taste_profile: TasteProfile,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListCoffeesDto {
    pub search: Option<String>,
    pub favorites_only: bool,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCoffeeDto {
    pub roaster: String,
    pub description: String,
    pub favorite: bool,
    pub grinded: bool,
    pub grinding_time: Option<String>,
    pub grinding_degree: Option<String>,
    pub coffee_amount: Option<String>,
    pub servings: Option<String>,
    pub percent_arabica: Option<i32>,
    pub crema_rating: Option<u8>,
    pub taste_rating: Option<u8>,
    pub taste_notes: Option<String>,
    pub url: Option<String>,
    pub comment: Option<String>,
    pub origin: Option<String>,
    pub roast_level: Option<String>,
    pub brewing_method: Option<String>,
    pub recommended_method: Option<String>,
    pub price: Option<String>,
    pub package_size: Option<u32>,
    pub currency: Option<String>,
    pub preparation_notes: Option<String>,
    pub coffee_group: Option<String>,
}

/// Fields to change; an empty string clears an optional text field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCoffeeDto {
    pub roaster: Option<String>,
    pub description: Option<String>,
    pub favorite: Option<bool>,
    pub grinded: Option<bool>,
    pub grinding_time: Option<String>,
    pub grinding_degree: Option<String>,
    pub coffee_amount: Option<String>,
    pub servings: Option<String>,
    pub percent_arabica: Option<i32>,
    pub crema_rating: Option<u8>,
    pub taste_rating: Option<u8>,
    pub taste_notes: Option<String>,
    pub url: Option<String>,
    pub comment: Option<String>,
    pub origin: Option<String>,
    pub roast_level: Option<String>,
    pub brewing_method: Option<String>,
    pub recommended_method: Option<String>,
    pub price: Option<String>,
    pub package_size: Option<u32>,
    pub currency: Option<String>,
    pub preparation_notes: Option<String>,
    pub coffee_group: Option<String>,
}

// ============================================================================
// STORAGE DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfoDto {
    pub backend: String,
    pub remote_enabled: bool,
    pub local: StorageInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFileDto {
    pub path: String,
    pub entries: usize,
    pub from_fallback: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountDto {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinStatusDto {
    pub verified: bool,
}

// ============================================================================
// RESPONSE DTOs
// ============================================================================

/// Data plus where it came from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedDto<T> {
    pub success: bool,
    pub data: T,
    pub from_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl<T> LoadedDto<T> {
    /// Convert a service result, mapping the payload with `f`
    pub fn from_loaded<S>(loaded: Loaded<S>, f: impl FnOnce(S) -> T) -> Self {
        let fallback_reason = loaded.fallback_reason().map(str::to_string);
        Self {
            success: true,
            data: f(loaded.into_data()),
            from_fallback: fallback_reason.is_some(),
            fallback_reason,
        }
    }
}

// ============================================================================
// CONVERSION HELPERS (Domain → DTO)
// ============================================================================

impl From<CoffeeEntry> for CoffeeDto {
    fn from(entry: CoffeeEntry) -> Self {
        Self {
            main_roaster: entry.main_roaster().to_string(),
            cost: cost_breakdown(&entry),
            value_score: value_score(&entry),
            taste_profile: TasteProfile::from_notes(entry.taste_notes.as_deref()),
            entry,
        }
    }
}
