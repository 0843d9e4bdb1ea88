// src/services/statistics_service.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::statistics::{
    BlendShare, CollectionStatistics, GrindSummary, OriginCount, PriceAnalysis, RoastLevelCount,
    RoasterCount,
};
use crate::domain::{cost_per_cup, price_per_kg, value_score, CoffeeEntry};
use crate::error::AppResult;
use crate::services::{CoffeeService, Loaded};

const TOP_ROASTERS: usize = 6;
const TOP_ORIGINS: usize = 8;

pub struct StatisticsService {
    coffee_service: Arc<CoffeeService>,
}

impl StatisticsService {
    pub fn new(coffee_service: Arc<CoffeeService>) -> Self {
        Self { coffee_service }
    }

    /// Statistics over the current collection, from whichever backend served it
    pub async fn collection_statistics(&self) -> AppResult<Loaded<CollectionStatistics>> {
        let loaded = self.coffee_service.list_all().await?;
        Ok(loaded.map(|entries| compute_statistics(&entries)))
    }
}

pub fn compute_statistics(entries: &[CoffeeEntry]) -> CollectionStatistics {
    let price_analysis = price_analysis(entries);
    let average_cost_per_cup = if price_analysis.is_empty() {
        None
    } else {
        let total: f64 = price_analysis.iter().map(|p| p.cost_per_cup).sum();
        Some(total / price_analysis.len() as f64)
    };

    CollectionStatistics {
        total_entries: entries.len(),
        top_roasters: top_roasters(entries),
        blend: blend_share(entries),
        roast_levels: roast_levels(entries),
        origins: origins(entries),
        grind_by_brand: grind_by_brand(entries),
        price_analysis,
        average_cost_per_cup,
        generated_at: Utc::now(),
    }
}

/// Counts in first-seen order, so equal counts keep a stable order after sorting
fn count_in_order<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.to_string(), counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }
    counts
}

fn top_roasters(entries: &[CoffeeEntry]) -> Vec<RoasterCount> {
    let mut counts = count_in_order(entries.iter().map(|e| e.main_roaster()));
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(TOP_ROASTERS)
        .map(|(name, count)| RoasterCount { name, count })
        .collect()
}

/// Average arabica share; robusta is the remainder. An empty collection reads 50/50.
fn blend_share(entries: &[CoffeeEntry]) -> BlendShare {
    let average_arabica = if entries.is_empty() {
        50.0
    } else {
        entries.iter().map(|e| e.percent_arabica as f64).sum::<f64>() / entries.len() as f64
    };

    BlendShare {
        arabica: average_arabica.round() as i32,
        robusta: (100.0 - average_arabica).round() as i32,
    }
}

fn roast_levels(entries: &[CoffeeEntry]) -> Vec<RoastLevelCount> {
    count_in_order(
        entries
            .iter()
            .map(|e| e.roast_level.map(|l| l.as_str()).unwrap_or("unknown")),
    )
    .into_iter()
    .map(|(level, count)| RoastLevelCount { level, count })
    .collect()
}

fn origins(entries: &[CoffeeEntry]) -> Vec<OriginCount> {
    let codes: Vec<String> = entries
        .iter()
        .flat_map(|e| e.origin_codes())
        .map(|code| code.to_uppercase())
        .collect();

    let mut counts = count_in_order(codes.iter().map(String::as_str));
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(TOP_ORIGINS)
        .map(|(code, count)| OriginCount { code, count })
        .collect()
}

/// Grinder settings per main roaster, finest average first
fn grind_by_brand(entries: &[CoffeeEntry]) -> Vec<GrindSummary> {
    let mut brands: Vec<(String, Vec<i64>)> = Vec::new();

    for entry in entries {
        let Some(grind) = leading_integer(entry.grinding_degree.as_deref()) else {
            continue;
        };
        let brand = entry.main_roaster();
        match brands.iter_mut().find(|(b, _)| b == brand) {
            Some((_, grinds)) => grinds.push(grind),
            None => brands.push((brand.to_string(), vec![grind])),
        }
    }

    let mut summaries: Vec<GrindSummary> = brands
        .into_iter()
        .map(|(brand, grinds)| {
            let total: i64 = grinds.iter().sum();
            let average = total as f64 / grinds.len() as f64;
            GrindSummary {
                brand,
                average: (average * 10.0).round() / 10.0,
                min: grinds.iter().copied().min().unwrap_or_default(),
                max: grinds.iter().copied().max().unwrap_or_default(),
                count: grinds.len(),
            }
        })
        .collect();

    summaries.sort_by(|a, b| a.average.total_cmp(&b.average));
    summaries
}

/// Cost figures for every priced entry, cheapest cup first
fn price_analysis(entries: &[CoffeeEntry]) -> Vec<PriceAnalysis> {
    let mut analysis: Vec<PriceAnalysis> = entries
        .iter()
        .filter_map(|entry| {
            Some(PriceAnalysis {
                roaster: entry.main_roaster().to_string(),
                description: entry.description.clone(),
                cost_per_cup: cost_per_cup(entry)?,
                price_per_kg: price_per_kg(entry)?,
                taste_rating: entry.taste_rating,
                value_score: value_score(entry),
            })
        })
        .collect();

    analysis.sort_by(|a, b| a.cost_per_cup.total_cmp(&b.cost_per_cup));
    analysis
}

/// Integer prefix of a grinder setting such as "8" or "12 (fine)"
fn leading_integer(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    let end = raw
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}
