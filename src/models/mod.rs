//! Data models
//!
//! Food records from lookups, purchase records in the ledger, and the shared
//! nutrition structures.

mod food_record;
mod nutrition;
mod purchase;

pub use food_record::{
    FoodKind, FoodRecord, FoodSummary, UnitOption, GENERIC_BRAND, SERVING_UNIT,
};
pub use nutrition::{BaseNutrition, Nutrition, NutritionTotals};
pub use purchase::{PurchaseInput, PurchaseRecord, DEFAULT_CATEGORY};
pub(crate) use purchase::normalize_category;
