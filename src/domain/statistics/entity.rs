use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of a whole coffee collection, derived on demand
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStatistics {
    pub total_entries: usize,
    pub top_roasters: Vec<RoasterCount>,
    pub blend: BlendShare,
    pub roast_levels: Vec<RoastLevelCount>,
    pub origins: Vec<OriginCount>,
    pub grind_by_brand: Vec<GrindSummary>,
    pub price_analysis: Vec<PriceAnalysis>,
    pub average_cost_per_cup: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoasterCount {
    pub name: String,
    pub count: usize,
}

/// Average arabica/robusta split, rounded to whole percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlendShare {
    pub arabica: i32,
    pub robusta: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastLevelCount {
    /// Roast level id, or "unknown"
    pub level: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginCount {
    pub code: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrindSummary {
    pub brand: String,
    /// Rounded to one decimal
    pub average: f64,
    pub min: i64,
    pub max: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAnalysis {
    pub roaster: String,
    pub description: String,
    pub cost_per_cup: f64,
    pub price_per_kg: f64,
    pub taste_rating: u8,
    pub value_score: Option<f64>,
}
