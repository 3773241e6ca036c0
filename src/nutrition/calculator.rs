//! Nutrition calculator
//!
//! Converts a quantity of a purchasable unit into base servings and scales the
//! food's per-serving nutrition accordingly. Pure and cheap, so it backs both
//! the live preview and the values frozen into purchase records.

use thiserror::Error;

use crate::models::{FoodRecord, NutritionTotals};

/// Calculation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("Quantity must be a finite number greater than 0, got {0}")]
    InvalidQuantity(f64),
}

/// Base servings represented by `quantity` counts of `unit_label`
pub fn servings_for(
    record: &FoodRecord,
    quantity: f64,
    unit_label: &str,
) -> Result<f64, NutritionError> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(NutritionError::InvalidQuantity(quantity));
    }

    let unit = record
        .unit(unit_label)
        .ok_or_else(|| NutritionError::UnknownUnit(unit_label.to_string()))?;

    Ok(quantity * unit.multiplier)
}

/// Total calories, protein, fat and carbs for a purchase.
///
/// Each axis is `base * quantity * multiplier`, rounded half away from zero.
/// Missing nutrition axes count as zero.
pub fn compute_nutrition(
    record: &FoodRecord,
    quantity: f64,
    unit_label: &str,
) -> Result<NutritionTotals, NutritionError> {
    let servings = servings_for(record, quantity, unit_label)?;
    Ok(record.base_nutrition.resolve().scale(servings).round())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaseNutrition, UnitOption};

    fn chicken() -> FoodRecord {
        FoodRecord::new(
            "Chicken Breast",
            Some("Perdue".into()),
            BaseNutrition::new(748.0, 140.0, 16.0, 0.0),
            vec![
                UnitOption::new("lb", 1.0),
                UnitOption::new("oz", 0.0625),
                UnitOption::new("breast", 0.5),
            ],
        )
    }

    #[test]
    fn test_two_pounds() {
        let totals = compute_nutrition(&chicken(), 2.0, "lb").unwrap();
        assert_eq!(totals.calories, 1496);
        assert_eq!(totals.protein, 280);
        assert_eq!(totals.fat, 32);
        assert_eq!(totals.carbs, 0);
    }

    #[test]
    fn test_eight_ounces() {
        let totals = compute_nutrition(&chicken(), 8.0, "oz").unwrap();
        assert_eq!(totals.calories, 374);
        assert_eq!(totals.protein, 70);
        assert_eq!(totals.fat, 8);
    }

    #[test]
    fn test_fractional_multiplier_rounds() {
        let eggs = FoodRecord::new(
            "Large Eggs",
            None,
            BaseNutrition::new(840.0, 72.0, 60.0, 12.0),
            vec![UnitOption::new("dozen", 1.0), UnitOption::new("egg", 0.083)],
        );
        // 840 * 0.083 = 69.72
        let totals = compute_nutrition(&eggs, 1.0, "egg").unwrap();
        assert_eq!(totals.calories, 70);
        assert_eq!(totals.carbs, 1);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert_eq!(
            compute_nutrition(&chicken(), 0.0, "lb"),
            Err(NutritionError::InvalidQuantity(0.0))
        );
        assert!(matches!(
            compute_nutrition(&chicken(), -1.0, "lb"),
            Err(NutritionError::InvalidQuantity(_))
        ));
        assert!(matches!(
            compute_nutrition(&chicken(), f64::NAN, "lb"),
            Err(NutritionError::InvalidQuantity(_))
        ));
        assert!(matches!(
            compute_nutrition(&chicken(), f64::INFINITY, "lb"),
            Err(NutritionError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_unknown_unit() {
        assert_eq!(
            compute_nutrition(&chicken(), 1.0, "LB"),
            Err(NutritionError::UnknownUnit("LB".into()))
        );
        assert!(matches!(
            compute_nutrition(&chicken(), 1.0, "dozen"),
            Err(NutritionError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_zero_multiplier_gives_zero_nutrition() {
        let record = FoodRecord::new(
            "Water",
            None,
            BaseNutrition::new(10.0, 1.0, 1.0, 1.0),
            vec![UnitOption::new("bottle", 0.0)],
        );
        let totals = compute_nutrition(&record, 3.0, "bottle").unwrap();
        assert_eq!(totals, NutritionTotals::default());
    }

    #[test]
    fn test_missing_axes_count_as_zero() {
        let record = FoodRecord::new(
            "Rotisserie Chicken",
            Some("Costco".into()),
            BaseNutrition {
                calories: Some(1037.0),
                protein: None,
                fat: None,
                carbs: Some(0.0),
            },
            vec![UnitOption::new("whole chicken", 1.0)],
        );
        let totals = compute_nutrition(&record, 1.0, "whole chicken").unwrap();
        assert_eq!(totals.calories, 1037);
        assert_eq!(totals.protein, 0);
        assert_eq!(totals.fat, 0);
    }

    #[test]
    fn test_servings_for() {
        let servings = servings_for(&chicken(), 4.0, "breast").unwrap();
        assert!((servings - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_calls_are_deterministic() {
        let record = chicken();
        let first = compute_nutrition(&record, 1.5, "breast").unwrap();
        let second = compute_nutrition(&record, 1.5, "breast").unwrap();
        assert_eq!(first, second);
    }
}
