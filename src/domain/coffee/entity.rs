use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// A single coffee tasting record
///
/// Field names serialize in camelCase, the casing used by the local snapshot
/// and by export files. Columns the struct does not know about are kept in
/// `extra` so records written by newer schemas survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeEntry {
    /// Client-generated identifier (milliseconds since epoch at creation)
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub roaster: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub favorite: bool,

    /// Bought pre-ground
    #[serde(default, deserialize_with = "null_as_default")]
    pub grinded: bool,

    #[serde(default)]
    pub grinding_time: Option<String>,

    #[serde(default)]
    pub grinding_degree: Option<String>,

    /// Grams of coffee used for one brew
    #[serde(default)]
    pub coffee_amount: Option<String>,

    /// Cups produced by one brew
    #[serde(default)]
    pub servings: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub percent_arabica: i32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub percent_robusta: i32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub crema_rating: u8,

    #[serde(default, deserialize_with = "null_as_default")]
    pub taste_rating: u8,

    #[serde(default)]
    pub taste_notes: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    /// Comma-separated country codes, e.g. "BR,IN,ET"
    #[serde(default)]
    pub origin: Option<String>,

    #[serde(default, deserialize_with = "lenient_enum")]
    pub roast_level: Option<RoastLevel>,

    #[serde(default, deserialize_with = "lenient_enum")]
    pub brewing_method: Option<BrewingMethod>,

    #[serde(default, deserialize_with = "lenient_enum")]
    pub recommended_method: Option<BrewingMethod>,

    /// Package price as a decimal string
    #[serde(default)]
    pub price: Option<String>,

    /// Package size in grams
    #[serde(default)]
    pub package_size: Option<u32>,

    #[serde(default, deserialize_with = "lenient_enum")]
    pub currency: Option<Currency>,

    #[serde(default)]
    pub preparation_notes: Option<String>,

    /// Shared tag for preparation variants of the same beans
    #[serde(default)]
    pub coffee_group: Option<String>,

    /// Set on creation, never changed by edits
    #[serde(default = "Utc::now")]
    pub cupping_time: DateTime<Utc>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoastLevel {
    Light,
    LightMedium,
    Medium,
    MediumDark,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrewingMethod {
    Espresso,
    V60,
    Chemex,
    FrenchPress,
    AeroPress,
    Moka,
    Dripper,
    Filter,
    ColdBrew,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Gbp,
    Chf,
}

/// Partial update of a coffee entry
///
/// `None` leaves a field untouched. For optional fields `Some(None)` clears
/// the value. `id` and `cupping_time` cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roaster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grinded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grinding_time: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grinding_degree: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coffee_amount: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_arabica: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_robusta: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crema_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taste_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taste_notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roast_level: Option<Option<RoastLevel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brewing_method: Option<Option<BrewingMethod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_method: Option<Option<BrewingMethod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_size: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Option<Currency>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation_notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coffee_group: Option<Option<String>>,
}

/// Current time in milliseconds, used as a new entry id
pub fn generate_id() -> i64 {
    Utc::now().timestamp_millis()
}

impl CoffeeEntry {
    /// Create a new entry with the same defaults the entry form starts from
    pub fn new(roaster: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            roaster: roaster.into(),
            description: description.into(),
            favorite: false,
            grinded: false,
            grinding_time: None,
            grinding_degree: None,
            coffee_amount: None,
            servings: None,
            percent_arabica: 100,
            percent_robusta: 0,
            crema_rating: 0,
            taste_rating: 0,
            taste_notes: None,
            url: None,
            comment: None,
            origin: None,
            roast_level: Some(RoastLevel::Medium),
            brewing_method: Some(BrewingMethod::Espresso),
            recommended_method: Some(BrewingMethod::Espresso),
            price: None,
            package_size: Some(1000),
            currency: Some(Currency::Eur),
            preparation_notes: None,
            coffee_group: None,
            cupping_time: Utc::now(),
            extra: serde_json::Map::new(),
        }
    }

    /// Roaster name without the product suffix ("DieRöster - Suchan Bologna" -> "DieRöster")
    pub fn main_roaster(&self) -> &str {
        self.roaster
            .split(" - ")
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.roaster.as_str())
    }

    /// Country codes listed in `origin`
    pub fn origin_codes(&self) -> Vec<&str> {
        self.origin
            .as_deref()
            .map(|o| {
                o.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Non-empty coffee group, if any
    pub fn group(&self) -> Option<&str> {
        self.coffee_group.as_deref().filter(|g| !g.trim().is_empty())
    }

    /// Arabica and robusta shares add up to 100
    pub fn blend_is_balanced(&self) -> bool {
        self.percent_arabica + self.percent_robusta == 100
    }

    /// Set the arabica share and balance robusta to the remainder
    pub fn set_arabica_share(&mut self, percent: i32) {
        let percent = percent.clamp(0, 100);
        self.percent_arabica = percent;
        self.percent_robusta = 100 - percent;
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, patch: &CoffeePatch) {
        if let Some(v) = &patch.roaster {
            self.roaster = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = patch.favorite {
            self.favorite = v;
        }
        if let Some(v) = patch.grinded {
            self.grinded = v;
        }
        if let Some(v) = &patch.grinding_time {
            self.grinding_time = v.clone();
        }
        if let Some(v) = &patch.grinding_degree {
            self.grinding_degree = v.clone();
        }
        if let Some(v) = &patch.coffee_amount {
            self.coffee_amount = v.clone();
        }
        if let Some(v) = &patch.servings {
            self.servings = v.clone();
        }
        if let Some(v) = patch.percent_arabica {
            self.percent_arabica = v;
        }
        if let Some(v) = patch.percent_robusta {
            self.percent_robusta = v;
        }
        if let Some(v) = patch.crema_rating {
            self.crema_rating = v;
        }
        if let Some(v) = patch.taste_rating {
            self.taste_rating = v;
        }
        if let Some(v) = &patch.taste_notes {
            self.taste_notes = v.clone();
        }
        if let Some(v) = &patch.url {
            self.url = v.clone();
        }
        if let Some(v) = &patch.comment {
            self.comment = v.clone();
        }
        if let Some(v) = &patch.origin {
            self.origin = v.clone();
        }
        if let Some(v) = patch.roast_level {
            self.roast_level = v;
        }
        if let Some(v) = patch.brewing_method {
            self.brewing_method = v;
        }
        if let Some(v) = patch.recommended_method {
            self.recommended_method = v;
        }
        if let Some(v) = &patch.price {
            self.price = v.clone();
        }
        if let Some(v) = patch.package_size {
            self.package_size = v;
        }
        if let Some(v) = patch.currency {
            self.currency = v;
        }
        if let Some(v) = &patch.preparation_notes {
            self.preparation_notes = v.clone();
        }
        if let Some(v) = &patch.coffee_group {
            self.coffee_group = v.clone();
        }
    }
}

impl CoffeePatch {
    pub fn is_empty(&self) -> bool {
        *self == CoffeePatch::default()
    }
}

impl RoastLevel {
    pub const ALL: [RoastLevel; 5] = [
        RoastLevel::Light,
        RoastLevel::LightMedium,
        RoastLevel::Medium,
        RoastLevel::MediumDark,
        RoastLevel::Dark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoastLevel::Light => "light",
            RoastLevel::LightMedium => "light-medium",
            RoastLevel::Medium => "medium",
            RoastLevel::MediumDark => "medium-dark",
            RoastLevel::Dark => "dark",
        }
    }
}

impl BrewingMethod {
    pub const ALL: [BrewingMethod; 9] = [
        BrewingMethod::Espresso,
        BrewingMethod::V60,
        BrewingMethod::Chemex,
        BrewingMethod::FrenchPress,
        BrewingMethod::AeroPress,
        BrewingMethod::Moka,
        BrewingMethod::Dripper,
        BrewingMethod::Filter,
        BrewingMethod::ColdBrew,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrewingMethod::Espresso => "espresso",
            BrewingMethod::V60 => "v60",
            BrewingMethod::Chemex => "chemex",
            BrewingMethod::FrenchPress => "frenchpress",
            BrewingMethod::AeroPress => "aeropress",
            BrewingMethod::Moka => "moka",
            BrewingMethod::Dripper => "dripper",
            BrewingMethod::Filter => "filter",
            BrewingMethod::ColdBrew => "coldbrew",
        }
    }
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Chf => "CHF",
        }
    }
}

impl FromStr for RoastLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoastLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown roast level: {}", s))
    }
}

impl FromStr for BrewingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrewingMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown brewing method: {}", s))
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            "CHF" => Ok(Currency::Chf),
            _ => Err(format!("Unknown currency: {}", s)),
        }
    }
}

impl std::fmt::Display for RoastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for BrewingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Older records carry empty strings or retired values in enum columns;
/// those read as "not set" instead of failing the whole snapshot.
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry_defaults() {
        let entry = CoffeeEntry::new("Lavazza", "Crema");
        assert_eq!(entry.percent_arabica, 100);
        assert_eq!(entry.percent_robusta, 0);
        assert_eq!(entry.brewing_method, Some(BrewingMethod::Espresso));
        assert_eq!(entry.package_size, Some(1000));
        assert_eq!(entry.currency, Some(Currency::Eur));
        assert!(entry.id > 0);
    }

    #[test]
    fn test_deserializes_camel_case_with_unknown_fields() {
        let entry: CoffeeEntry = serde_json::from_value(json!({
            "id": 17,
            "roaster": "DieRöster - Suchan Bologna",
            "description": "leichte Frucht",
            "percentArabica": 90,
            "percentRobusta": 10,
            "roastLevel": "medium-dark",
            "brewingMethod": "frenchpress",
            "currency": "CHF",
            "cuppingTime": "2023-01-20T10:16:45Z",
            "rating_source": "manual"
        }))
        .unwrap();

        assert_eq!(entry.id, 17);
        assert_eq!(entry.roast_level, Some(RoastLevel::MediumDark));
        assert_eq!(entry.brewing_method, Some(BrewingMethod::FrenchPress));
        assert_eq!(entry.currency, Some(Currency::Chf));
        assert_eq!(entry.main_roaster(), "DieRöster");
        assert_eq!(entry.extra.get("rating_source"), Some(&json!("manual")));
    }

    #[test]
    fn test_lenient_enums_and_nulls() {
        let entry: CoffeeEntry = serde_json::from_value(json!({
            "id": 1,
            "roaster": "X",
            "description": null,
            "favorite": null,
            "roastLevel": "",
            "brewingMethod": "siphon"
        }))
        .unwrap();

        assert_eq!(entry.description, "");
        assert!(!entry.favorite);
        assert_eq!(entry.roast_level, None);
        assert_eq!(entry.brewing_method, None);
    }

    #[test]
    fn test_apply_patch_preserves_identity() {
        let mut entry = CoffeeEntry::new("Lavazza", "Crema");
        entry.taste_notes = Some("nutty".to_string());
        let id = entry.id;
        let cupping_time = entry.cupping_time;

        let patch = CoffeePatch {
            taste_rating: Some(4),
            taste_notes: Some(None),
            coffee_group: Some(Some("lavazza-crema".to_string())),
            ..Default::default()
        };
        entry.apply(&patch);

        assert_eq!(entry.id, id);
        assert_eq!(entry.cupping_time, cupping_time);
        assert_eq!(entry.taste_rating, 4);
        assert_eq!(entry.taste_notes, None);
        assert_eq!(entry.group(), Some("lavazza-crema"));
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = CoffeePatch {
            favorite: Some(true),
            price: Some(None),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "favorite": true, "price": null }));
        assert!(!patch.is_empty());
        assert!(CoffeePatch::default().is_empty());
    }

    #[test]
    fn test_blend_balancing() {
        let mut entry = CoffeeEntry::new("A", "B");
        entry.set_arabica_share(40);
        assert_eq!(entry.percent_robusta, 60);
        assert!(entry.blend_is_balanced());

        entry.percent_robusta = 70;
        assert!(!entry.blend_is_balanced());
    }

    #[test]
    fn test_origin_codes() {
        let mut entry = CoffeeEntry::new("A", "B");
        entry.origin = Some("BR, IN,,ET".to_string());
        assert_eq!(entry.origin_codes(), vec!["BR", "IN", "ET"]);
    }
}
