// Derived cost and value figures for a coffee entry

use serde::Serialize;

use super::entity::{BrewingMethod, CoffeeEntry, Currency};

/// Dose used when an entry has no brewing method
pub const DEFAULT_GRAMS_PER_CUP: f64 = 18.0;

/// Cost figures derived from price and package size
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub cost_per_cup: f64,
    pub price_per_kg: f64,
    pub currency: Currency,
}

/// Typical dose in grams for one cup with the given method
pub fn grams_for_method(method: Option<BrewingMethod>) -> f64 {
    match method {
        Some(BrewingMethod::Espresso) => 18.0,
        Some(BrewingMethod::Filter)
        | Some(BrewingMethod::V60)
        | Some(BrewingMethod::Chemex)
        | Some(BrewingMethod::Dripper) => 15.0,
        Some(BrewingMethod::FrenchPress) => 17.0,
        Some(BrewingMethod::AeroPress) => 17.0,
        Some(BrewingMethod::Moka) => 18.0,
        Some(BrewingMethod::ColdBrew) => 30.0,
        None => DEFAULT_GRAMS_PER_CUP,
    }
}

/// Grams per cup, preferring the recorded dose split over servings
pub fn grams_per_cup(entry: &CoffeeEntry) -> f64 {
    let amount = parse_positive(entry.coffee_amount.as_deref());
    match amount {
        Some(grams) => {
            let servings = parse_positive(entry.servings.as_deref()).unwrap_or(1.0);
            grams / servings
        }
        None => grams_for_method(entry.brewing_method),
    }
}

/// Package price in the entry's currency, if it parses as a positive number
pub fn price(entry: &CoffeeEntry) -> Option<f64> {
    parse_positive(entry.price.as_deref())
}

pub fn cost_per_cup(entry: &CoffeeEntry) -> Option<f64> {
    let price = price(entry)?;
    let package = entry.package_size.filter(|size| *size > 0)? as f64;
    Some(price / package * grams_per_cup(entry))
}

pub fn price_per_kg(entry: &CoffeeEntry) -> Option<f64> {
    let price = price(entry)?;
    let package = entry.package_size.filter(|size| *size > 0)? as f64;
    Some(price / package * 1000.0)
}

/// Taste rating per unit of cost; higher is better
pub fn value_score(entry: &CoffeeEntry) -> Option<f64> {
    if entry.taste_rating == 0 {
        return None;
    }
    let cost = cost_per_cup(entry)?;
    Some(entry.taste_rating as f64 / cost)
}

pub fn cost_breakdown(entry: &CoffeeEntry) -> Option<CostBreakdown> {
    Some(CostBreakdown {
        cost_per_cup: cost_per_cup(entry)?,
        price_per_kg: price_per_kg(entry)?,
        currency: entry.currency.unwrap_or(Currency::Eur),
    })
}

fn parse_positive(raw: Option<&str>) -> Option<f64> {
    raw.map(|s| s.trim().replace(',', "."))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}
