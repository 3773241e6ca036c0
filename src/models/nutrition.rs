//! Shared nutrition data structures
//!
//! Used by food records, the calculator, purchase records and analytics.

use serde::{Deserialize, Serialize};

/// Nutritional values for some amount of food
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64, // grams
    pub fat: f64,     // grams
    pub carbs: f64,   // grams
}

impl Nutrition {
    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            fat: self.fat * multiplier,
            carbs: self.carbs * multiplier,
        }
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            carbs: self.carbs + other.carbs,
        }
    }

    /// Round every axis to the nearest integer (ties away from zero), clamped at zero
    pub fn round(&self) -> NutritionTotals {
        NutritionTotals {
            calories: round_non_negative(self.calories),
            protein: round_non_negative(self.protein),
            fat: round_non_negative(self.fat),
            carbs: round_non_negative(self.carbs),
        }
    }
}

fn round_non_negative(value: f64) -> i64 {
    if value.is_finite() && value > 0.0 {
        value.round() as i64
    } else {
        0
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

/// Per-base-serving nutrition as reported by a lookup source.
///
/// Any axis may be absent. `resolve` treats absent, negative and non-finite
/// values as zero so they never propagate into sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseNutrition {
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
}

impl BaseNutrition {
    /// All four axes present
    pub fn new(calories: f64, protein: f64, fat: f64, carbs: f64) -> Self {
        Self {
            calories: Some(calories),
            protein: Some(protein),
            fat: Some(fat),
            carbs: Some(carbs),
        }
    }

    pub fn resolve(&self) -> Nutrition {
        Nutrition {
            calories: axis_or_zero(self.calories),
            protein: axis_or_zero(self.protein),
            fat: axis_or_zero(self.fat),
            carbs: axis_or_zero(self.carbs),
        }
    }
}

fn axis_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Rounded nutrition totals frozen into a purchase record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: i64,
    pub protein: i64,
    pub fat: i64,
    pub carbs: i64,
}

impl std::ops::Add for NutritionTotals {
    type Output = NutritionTotals;

    fn add(self, other: NutritionTotals) -> NutritionTotals {
        NutritionTotals {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            carbs: self.carbs + other.carbs,
        }
    }
}

impl std::iter::Sum for NutritionTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutritionTotals::default(), |acc, n| acc + n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_and_sum() {
        let n = Nutrition { calories: 100.0, protein: 10.0, fat: 5.0, carbs: 20.0 };
        let total: Nutrition = vec![n, n * 2.0].into_iter().sum();
        assert_eq!(total.calories, 300.0);
        assert_eq!(total.carbs, 60.0);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        let n = Nutrition { calories: 2.5, protein: 0.49, fat: 3.5, carbs: 0.5 };
        let t = n.round();
        assert_eq!(t.calories, 3);
        assert_eq!(t.protein, 0);
        assert_eq!(t.fat, 4);
        assert_eq!(t.carbs, 1);
    }

    #[test]
    fn test_round_never_negative() {
        let n = Nutrition { calories: -4.0, protein: f64::NAN, fat: 1.0, carbs: 0.0 };
        let t = n.round();
        assert_eq!(t.calories, 0);
        assert_eq!(t.protein, 0);
        assert_eq!(t.fat, 1);
    }

    #[test]
    fn test_missing_axes_resolve_to_zero() {
        let base = BaseNutrition {
            calories: Some(1037.0),
            protein: None,
            fat: Some(-1.0),
            carbs: Some(f64::INFINITY),
        };
        let n = base.resolve();
        assert_eq!(n.calories, 1037.0);
        assert_eq!(n.protein, 0.0);
        assert_eq!(n.fat, 0.0);
        assert_eq!(n.carbs, 0.0);
    }

    #[test]
    fn test_base_nutrition_deserializes_partial() {
        let base: BaseNutrition = serde_json::from_str(r#"{"calories": 52.0}"#).unwrap();
        assert_eq!(base.calories, Some(52.0));
        assert_eq!(base.fat, None);
    }
}
