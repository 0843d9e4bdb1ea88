// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod coffee;
pub mod statistics;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Coffee Domain
pub use coffee::{
    cost_breakdown, cost_per_cup, generate_id, grams_for_method, grams_per_cup, price_per_kg,
    validate_entry, validate_patch, value_score, BrewingMethod, CoffeeEntry, CoffeePatch, CostBreakdown, Currency,
    RoastLevel, TasteProfile,
};

// Statistics Domain (Derived Data)
pub use statistics::CollectionStatistics;

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
