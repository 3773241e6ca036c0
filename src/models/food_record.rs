//! Food record model
//!
//! A food as returned by a lookup source, with the purchasable units it can be
//! bought in. Immutable once selected for a purchase.

use serde::{Deserialize, Serialize};

use super::BaseNutrition;

/// Brand used when a lookup result carries none
pub const GENERIC_BRAND: &str = "Generic";

/// Label of the synthetic unit used when a lookup result omits units
pub const SERVING_UNIT: &str = "serving";

/// Whether a lookup hit is a branded product or a common food
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoodKind {
    Branded,
    #[default]
    Common,
}

impl FoodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodKind::Branded => "branded",
            FoodKind::Common => "common",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "branded" => FoodKind::Branded,
            _ => FoodKind::Common,
        }
    }
}

/// A candidate match from a search, used as the reference for a details request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSummary {
    /// Source-specific reference (catalog key, remote item id, or food name)
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    #[serde(default)]
    pub kind: FoodKind,
}

impl FoodSummary {
    /// "Brand Name" display string, as shown in a suggestion list
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand.as_deref().unwrap_or(GENERIC_BRAND), self.name)
    }
}

/// A purchasable unit of a food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOption {
    pub label: String,
    /// Base servings per one count of this unit
    pub multiplier: f64,
    /// Preset quantities for autofill; not used in calculation
    #[serde(default)]
    pub typical_sizes: Vec<String>,
}

impl UnitOption {
    pub fn new(label: impl Into<String>, multiplier: f64) -> Self {
        Self {
            label: label.into(),
            multiplier,
            typical_sizes: Vec::new(),
        }
    }

    pub fn with_sizes(mut self, sizes: &[&str]) -> Self {
        self.typical_sizes = sizes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// The synthetic one-serving unit
    pub fn serving() -> Self {
        Self::new(SERVING_UNIT, 1.0).with_sizes(&["1 serving"])
    }
}

/// A food with per-base-serving nutrition and its unit catalog.
///
/// Deserialization goes through [`FoodRecord::new`], so stored or remote
/// records get the same defaulting as constructed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFoodRecord")]
pub struct FoodRecord {
    pub name: String,
    pub brand: String,
    pub base_nutrition: BaseNutrition,
    /// Never empty; the first entry is the default unit
    pub units: Vec<UnitOption>,
}

/// Wire shape of a food record before normalization
#[derive(Deserialize)]
struct RawFoodRecord {
    name: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    base_nutrition: BaseNutrition,
    #[serde(default)]
    units: Vec<UnitOption>,
}

impl From<RawFoodRecord> for FoodRecord {
    fn from(raw: RawFoodRecord) -> Self {
        FoodRecord::new(raw.name, raw.brand, raw.base_nutrition, raw.units)
    }
}

impl FoodRecord {
    /// Build a record, applying the lookup defaulting rules.
    ///
    /// - a missing or blank brand becomes [`GENERIC_BRAND`]
    /// - units with a negative or non-finite multiplier are dropped
    /// - an empty unit list becomes a single [`SERVING_UNIT`] with multiplier 1
    pub fn new(
        name: impl Into<String>,
        brand: Option<String>,
        base_nutrition: BaseNutrition,
        units: Vec<UnitOption>,
    ) -> Self {
        let name = name.into();
        let brand = brand
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| GENERIC_BRAND.to_string());

        let mut kept = Vec::with_capacity(units.len());
        for unit in units {
            if unit.multiplier.is_finite() && unit.multiplier >= 0.0 {
                kept.push(unit);
            } else {
                tracing::warn!(
                    "Dropping unit '{}' of '{}': invalid multiplier {}",
                    unit.label,
                    name,
                    unit.multiplier
                );
            }
        }
        if kept.is_empty() {
            kept.push(UnitOption::serving());
        }

        Self {
            name,
            brand,
            base_nutrition,
            units: kept,
        }
    }

    /// The unit preselected when this record is chosen
    pub fn default_unit(&self) -> Option<&UnitOption> {
        self.units.first()
    }

    /// Exact, case-sensitive label match
    pub fn unit(&self, label: &str) -> Option<&UnitOption> {
        self.units.iter().find(|u| u.label == label)
    }

    pub fn unit_labels(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.label.as_str()).collect()
    }
}
