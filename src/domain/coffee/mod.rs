pub mod entity;
pub mod invariants;
pub mod metrics;
pub mod taste;

pub use entity::{generate_id, BrewingMethod, CoffeeEntry, CoffeePatch, Currency, RoastLevel};
pub use invariants::{validate_entry, validate_patch, MAX_RATING};
pub use metrics::{cost_breakdown, cost_per_cup, grams_for_method, grams_per_cup, price_per_kg, value_score, CostBreakdown};
pub use taste::TasteProfile;
