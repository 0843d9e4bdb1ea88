// src/services/catalog.rs
//
// Catalog queries over an already loaded collection
//
// Pure functions: nothing here touches storage.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::{cost_per_cup, value_score, CoffeeEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest cupping first
    #[default]
    Date,
    /// Highest taste rating first
    Rating,
    Roaster,
    PriceLowHigh,
    PriceHighLow,
    /// Best taste per cost first
    Value,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "date" => Ok(SortKey::Date),
            "rating" => Ok(SortKey::Rating),
            "roaster" => Ok(SortKey::Roaster),
            "price_low_high" | "pricelowhigh" => Ok(SortKey::PriceLowHigh),
            "price_high_low" | "pricehighlow" => Ok(SortKey::PriceHighLow),
            "value" => Ok(SortKey::Value),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    /// Case-insensitive match on roaster or description
    pub search: Option<String>,
    pub favorites_only: bool,
    pub sort: SortKey,
}

/// All entries of one main roaster
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoasterGroup {
    pub name: String,
    pub favorite_count: usize,
    pub average_rating: f64,
    pub variations: Vec<VariationGroup>,
}

impl RoasterGroup {
    pub fn entry_count(&self) -> usize {
        self.variations.iter().map(|v| v.entries.len()).sum()
    }
}

/// Entries sharing a coffee group, or a single ungrouped entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariationGroup {
    pub key: String,
    pub entries: Vec<CoffeeEntry>,
}

pub fn filter_entries(entries: Vec<CoffeeEntry>, query: &CatalogQuery) -> Vec<CoffeeEntry> {
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    entries
        .into_iter()
        .filter(|e| !query.favorites_only || e.favorite)
        .filter(|e| match &needle {
            Some(needle) => {
                e.roaster.to_lowercase().contains(needle)
                    || e.description.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect()
}

/// Stable sort; entries whose sort metric is undefined go last
pub fn sort_entries(entries: &mut [CoffeeEntry], key: SortKey) {
    match key {
        SortKey::Date => entries.sort_by(|a, b| b.cupping_time.cmp(&a.cupping_time)),
        SortKey::Rating => entries.sort_by(|a, b| b.taste_rating.cmp(&a.taste_rating)),
        SortKey::Roaster => entries.sort_by(|a, b| compare_names(&a.roaster, &b.roaster)),
        SortKey::PriceLowHigh => {
            entries.sort_by(|a, b| by_metric(cost_per_cup(a), cost_per_cup(b), false))
        }
        SortKey::PriceHighLow => {
            entries.sort_by(|a, b| by_metric(cost_per_cup(a), cost_per_cup(b), true))
        }
        SortKey::Value => {
            entries.sort_by(|a, b| by_metric(value_score(a), value_score(b), true))
        }
    }
}

/// Filter, then sort
pub fn run_query(entries: Vec<CoffeeEntry>, query: &CatalogQuery) -> Vec<CoffeeEntry> {
    let mut entries = filter_entries(entries, query);
    sort_entries(&mut entries, query.sort);
    entries
}

/// Group by main roaster, then by coffee group within each roaster
///
/// Roasters are ordered by favorite count, then average taste rating (at one
/// decimal), then name. Entry order inside a group follows the input.
pub fn group_by_roaster(entries: &[CoffeeEntry]) -> Vec<RoasterGroup> {
    let mut buckets: Vec<(String, Vec<CoffeeEntry>)> = Vec::new();
    for entry in entries {
        let name = entry.main_roaster();
        match buckets.iter_mut().find(|(n, _)| n == name) {
            Some((_, bucket)) => bucket.push(entry.clone()),
            None => buckets.push((name.to_string(), vec![entry.clone()])),
        }
    }

    let mut groups: Vec<RoasterGroup> = buckets
        .into_iter()
        .map(|(name, bucket)| {
            let favorite_count = bucket.iter().filter(|e| e.favorite).count();
            let total: u32 = bucket.iter().map(|e| e.taste_rating as u32).sum();
            RoasterGroup {
                name,
                favorite_count,
                average_rating: total as f64 / bucket.len() as f64,
                variations: group_variations(&bucket),
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.favorite_count
            .cmp(&a.favorite_count)
            .then_with(|| tenths(b.average_rating).cmp(&tenths(a.average_rating)))
            .then_with(|| compare_names(&a.name, &b.name))
    });
    groups
}

/// Entries keyed by coffee group, ungrouped entries on their own, in first-seen order
pub fn group_variations(entries: &[CoffeeEntry]) -> Vec<VariationGroup> {
    let mut groups: Vec<VariationGroup> = Vec::new();
    for entry in entries {
        let key = match entry.group() {
            Some(group) => group.to_string(),
            None => format!("individual-{}", entry.id),
        };
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.entries.push(entry.clone()),
            None => groups.push(VariationGroup {
                key,
                entries: vec![entry.clone()],
            }),
        }
    }
    groups
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Orders defined values; undefined sorts after every defined value either way
fn by_metric(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn tenths(value: f64) -> i64 {
    (value * 10.0).round() as i64
}
