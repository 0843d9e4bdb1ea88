use super::entity::{CoffeeEntry, CoffeePatch};
use crate::domain::{DomainError, DomainResult};

/// Highest value of crema and taste ratings
pub const MAX_RATING: u8 = 5;

/// Validates the rules an entry must satisfy before it is stored
pub fn validate_entry(entry: &CoffeeEntry) -> DomainResult<()> {
    validate_required_text("Roaster", &entry.roaster)?;
    validate_required_text("Description", &entry.description)?;
    validate_rating("Crema rating", entry.crema_rating)?;
    validate_rating("Taste rating", entry.taste_rating)?;
    validate_percentage("Arabica share", entry.percent_arabica)?;
    validate_percentage("Robusta share", entry.percent_robusta)?;
    Ok(())
}

/// Validates only the fields a patch sets
pub fn validate_patch(patch: &CoffeePatch) -> DomainResult<()> {
    if let Some(roaster) = &patch.roaster {
        validate_required_text("Roaster", roaster)?;
    }
    if let Some(description) = &patch.description {
        validate_required_text("Description", description)?;
    }
    if let Some(rating) = patch.crema_rating {
        validate_rating("Crema rating", rating)?;
    }
    if let Some(rating) = patch.taste_rating {
        validate_rating("Taste rating", rating)?;
    }
    if let Some(percent) = patch.percent_arabica {
        validate_percentage("Arabica share", percent)?;
    }
    if let Some(percent) = patch.percent_robusta {
        validate_percentage("Robusta share", percent)?;
    }
    Ok(())
}

fn validate_required_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}

fn validate_rating(field: &str, rating: u8) -> DomainResult<()> {
    if rating > MAX_RATING {
        return Err(DomainError::InvariantViolation(format!(
            "{} {} is outside 0..={}",
            field, rating, MAX_RATING
        )));
    }
    Ok(())
}

fn validate_percentage(field: &str, percent: i32) -> DomainResult<()> {
    if !(0..=100).contains(&percent) {
        return Err(DomainError::InvariantViolation(format!(
            "{} {} is outside 0..=100",
            field, percent
        )));
    }
    Ok(())
}

/// Invariants for coffee entries:
///
/// 1. `id` is unique within a collection (relied on for update/delete)
/// 2. Roaster and description are non-blank
/// 3. Ratings are within 0..=5
/// 4. Blend shares are within 0..=100
/// 5. Arabica + robusta == 100 is expected but NOT enforced; imported data may differ
/// 6. `cupping_time` never changes after creation

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_entry() {
        let entry = CoffeeEntry::new("Lavazza", "Crema");
        assert!(validate_entry(&entry).is_ok());
    }

    #[test]
    fn test_blank_roaster_fails() {
        let entry = CoffeeEntry::new("  ", "Crema");
        assert!(validate_entry(&entry).is_err());
    }

    #[test]
    fn test_rating_out_of_range_fails() {
        let mut entry = CoffeeEntry::new("Lavazza", "Crema");
        entry.taste_rating = 6;
        assert!(validate_entry(&entry).is_err());
    }

    #[test]
    fn test_unbalanced_blend_is_allowed() {
        let mut entry = CoffeeEntry::new("Lavazza", "Crema");
        entry.percent_arabica = 70;
        entry.percent_robusta = 20;
        assert!(validate_entry(&entry).is_ok());
    }

    #[test]
    fn test_patch_checks_only_present_fields() {
        assert!(validate_patch(&CoffeePatch::default()).is_ok());

        let blank_roaster = CoffeePatch {
            roaster: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_patch(&blank_roaster).is_err());

        let high_rating = CoffeePatch {
            crema_rating: Some(9),
            ..Default::default()
        };
        assert!(validate_patch(&high_rating).is_err());
    }
}
