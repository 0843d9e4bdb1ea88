// Keyword-based taste profile derived from free-text tasting notes

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Highest score of a single taste attribute
pub const MAX_TASTE_SCORE: u8 = 5;

/// Scores 0..=5 for the attributes shown on the taste radar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TasteProfile {
    pub chocolate: u8,
    pub nutty: u8,
    pub fruity: u8,
    pub floral: u8,
    pub earthy: u8,
    pub spicy: u8,
    pub sweet: u8,
    pub acidic: u8,
}

impl TasteProfile {
    /// Score tasting notes by keyword, then apply explicit `attribute: N` ratings
    pub fn from_notes(notes: Option<&str>) -> Self {
        let mut profile = TasteProfile::default();
        let Some(notes) = notes else {
            return profile;
        };
        let notes = notes.to_lowercase();
        let has = |needle: &str| notes.contains(needle);

        if has("chocolate") || has("cocoa") || has("cacao") {
            profile.chocolate = 4;
        }
        if has("dark chocolate") {
            profile.chocolate = 5;
        }

        if has("nutty") || has("nut") {
            profile.nutty = 3;
        }
        for nut in ["almond", "hazelnut", "walnut", "pecan"] {
            if has(nut) {
                profile.nutty = profile.nutty.max(4);
            }
        }

        if has("fruity") || has("fruit") || has("berry") || has("berries") || has("citrus") {
            profile.fruity = 4;
        }
        if has("lemon") {
            profile.fruity = profile.fruity.max(3);
        }

        if has("floral") || has("flower") || has("jasmine") {
            profile.floral = 4;
        }

        if has("earthy") || has("woody") || has("wood") {
            profile.earthy = 4;
        }

        if has("spicy") || has("spice") {
            profile.spicy = 4;
        }
        if has("cinnamon") {
            profile.spicy = profile.spicy.max(3);
        }

        if has("sweet") {
            profile.sweet = 3;
        }
        if has("caramel") || has("honey") {
            profile.sweet = profile.sweet.max(4);
        }
        if has("sugar") {
            profile.sweet = profile.sweet.max(3);
        }

        if has("acid") || has("bright") || has("lively") {
            profile.acidic = 4;
        }
        if has("low acidity") || has("no acidity") {
            profile.acidic = 1;
        }

        for (attribute, score) in explicit_ratings(&notes) {
            if let Some(slot) = profile.slot_mut(&attribute) {
                *slot = score;
            }
        }

        profile
    }

    fn slot_mut(&mut self, attribute: &str) -> Option<&mut u8> {
        match attribute {
            "chocolate" => Some(&mut self.chocolate),
            "nutty" => Some(&mut self.nutty),
            "fruity" => Some(&mut self.fruity),
            "floral" => Some(&mut self.floral),
            "earthy" => Some(&mut self.earthy),
            "spicy" => Some(&mut self.spicy),
            "sweet" => Some(&mut self.sweet),
            "acidic" => Some(&mut self.acidic),
            _ => None,
        }
    }
}

/// Ratings written as "chocolate: 4, nutty: 3"
fn explicit_ratings(notes: &str) -> Vec<(String, u8)> {
    static RATING: OnceLock<Regex> = OnceLock::new();
    let pattern = RATING.get_or_init(|| {
        Regex::new(r"(\w+):\s*(\d+)").unwrap_or_else(|e| panic!("invalid rating pattern: {e}"))
    });

    pattern
        .captures_iter(notes)
        .map(|caps| {
            // digits only, so a failed parse means overflow
            let score = caps[2].parse::<u32>().unwrap_or(u32::MAX);
            let score = score.min(u32::from(MAX_TASTE_SCORE)) as u8;
            (caps[1].to_lowercase(), score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_notes() {
        assert_eq!(TasteProfile::from_notes(None), TasteProfile::default());
        assert_eq!(TasteProfile::from_notes(Some("")), TasteProfile::default());
    }

    #[test]
    fn test_keyword_scoring() {
        let profile =
            TasteProfile::from_notes(Some("nutty, woody, chocolate, very low acidity"));
        assert_eq!(profile.chocolate, 4);
        assert_eq!(profile.nutty, 3);
        assert_eq!(profile.earthy, 4);
        assert_eq!(profile.acidic, 1);
        assert_eq!(profile.fruity, 0);
    }

    #[test]
    fn test_stronger_keywords_win() {
        let profile =
            TasteProfile::from_notes(Some("Dark Chocolate, hazelnut, honey, cinnamon, lemon"));
        assert_eq!(profile.chocolate, 5);
        assert_eq!(profile.nutty, 4);
        assert_eq!(profile.sweet, 4);
        assert_eq!(profile.spicy, 3);
        assert_eq!(profile.fruity, 3);
    }

    #[test]
    fn test_explicit_ratings_override_keywords() {
        let profile = TasteProfile::from_notes(Some("Chocolate: 2, Floral: 9, caramel"));
        assert_eq!(profile.chocolate, 2);
        assert_eq!(profile.floral, MAX_TASTE_SCORE);
        assert_eq!(profile.sweet, 4);
    }

    #[test]
    fn test_oversized_ratings_are_capped() {
        let profile = TasteProfile::from_notes(Some("floral: 999, spicy: 300, nutty: 99999999999"));
        assert_eq!(profile.floral, MAX_TASTE_SCORE);
        assert_eq!(profile.spicy, MAX_TASTE_SCORE);
        assert_eq!(profile.nutty, MAX_TASTE_SCORE);
    }
}
