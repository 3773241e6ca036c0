//! Nutrition calculation module
//!
//! Unit conversions and the purchase nutrition calculator.

pub mod calculator;
pub mod units;

pub use calculator::{compute_nutrition, servings_for, NutritionError};
pub use units::{grams_per_unit, merge_units, weight_unit_options, G_PER_KG, G_PER_LB, G_PER_OZ};
