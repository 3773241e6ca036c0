//! Purchase record model
//!
//! One logged grocery purchase. Food identity and nutrition are copied from the
//! selected food record at entry time and frozen, so later catalog changes never
//! rewrite history.
//!
//! Deserialization also accepts the field names used by the original browser
//! dashboard export (`brand_name`, `serving_unit`, `weight`, `pricePerUnit`,
//! `totalCalories`, `date`, ...).

use serde::{Deserialize, Deserializer, Serialize};

use super::{BaseNutrition, FoodRecord, NutritionTotals, UnitOption};

/// Category assigned when none is given
pub const DEFAULT_CATEGORY: &str = "Groceries";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Trimmed category, or [`DEFAULT_CATEGORY`] when missing or blank
pub(crate) fn normalize_category(category: Option<&str>) -> String {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(default_category)
}

/// Older exports may carry `null` or `""` here
fn deserialize_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(normalize_category(raw.as_deref()))
}

/// A logged purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: u64,
    pub food_name: String,
    #[serde(alias = "brand_name")]
    pub brand: String,
    #[serde(default = "default_category", deserialize_with = "deserialize_category")]
    pub category: String,
    #[serde(alias = "serving_unit")]
    pub unit_label: String,
    #[serde(alias = "weight")]
    pub quantity: f64,
    pub cost: f64,
    #[serde(alias = "pricePerUnit", default)]
    pub unit_price: f64,
    #[serde(alias = "totalCalories", default)]
    pub total_calories: i64,
    #[serde(alias = "totalProtein", default)]
    pub total_protein: i64,
    #[serde(alias = "totalFat", default)]
    pub total_fat: i64,
    #[serde(alias = "totalCarbs", default)]
    pub total_carbs: i64,
    /// RFC 3339 creation instant, e.g. "2026-10-19T14:03:11.250Z"
    #[serde(alias = "date")]
    pub timestamp: String,
}

impl PurchaseRecord {
    /// Calendar date of the purchase: the timestamp truncated at 'T'
    pub fn date(&self) -> &str {
        self.timestamp
            .split_once('T')
            .map(|(date, _)| date)
            .unwrap_or(&self.timestamp)
    }

    pub fn nutrition(&self) -> NutritionTotals {
        NutritionTotals {
            calories: self.total_calories,
            protein: self.total_protein,
            fat: self.total_fat,
            carbs: self.total_carbs,
        }
    }

    /// Rebuild a single-unit food record from this purchase, for editing
    /// when the original lookup result is no longer at hand.
    ///
    /// Per-unit nutrition is the frozen totals divided by the quantity, so one
    /// count of `unit_label` maps to one base serving.
    pub fn to_food_record(&self) -> FoodRecord {
        let per_unit = |total: i64| {
            if self.quantity > 0.0 {
                Some(total as f64 / self.quantity)
            } else {
                None
            }
        };

        FoodRecord::new(
            self.food_name.clone(),
            Some(self.brand.clone()),
            BaseNutrition {
                calories: per_unit(self.total_calories),
                protein: per_unit(self.total_protein),
                fat: per_unit(self.total_fat),
                carbs: per_unit(self.total_carbs),
            },
            vec![UnitOption::new(self.unit_label.clone(), 1.0)],
        )
    }
}

/// User-entered data for creating or replacing a purchase
#[derive(Debug, Clone)]
pub struct PurchaseInput {
    pub food: FoodRecord,
    pub unit_label: String,
    pub quantity: f64,
    pub cost: f64,
    /// Falls back to [`DEFAULT_CATEGORY`]
    pub category: Option<String>,
}

impl PurchaseInput {
    pub fn new(food: FoodRecord, unit_label: impl Into<String>, quantity: f64, cost: f64) -> Self {
        Self {
            food,
            unit_label: unit_label.into(),
            quantity,
            cost,
            category: None,
        }
    }

    pub fn category(&self) -> String {
        normalize_category(self.category.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PurchaseRecord {
        PurchaseRecord {
            id: 1,
            food_name: "Chicken Breast".into(),
            brand: "Perdue".into(),
            category: DEFAULT_CATEGORY.into(),
            unit_label: "lb".into(),
            quantity: 2.0,
            cost: 11.98,
            unit_price: 5.99,
            total_calories: 1496,
            total_protein: 280,
            total_fat: 32,
            total_carbs: 0,
            timestamp: "2026-10-19T14:03:11.250Z".into(),
        }
    }

    #[test]
    fn test_date_truncates_timestamp() {
        assert_eq!(sample().date(), "2026-10-19");

        let mut bare = sample();
        bare.timestamp = "2026-10-19".into();
        assert_eq!(bare.date(), "2026-10-19");
    }

    #[test]
    fn test_deserialize_legacy_dashboard_export() {
        let json = r#"{
            "id": 1760882591250,
            "food_name": "Large Eggs",
            "brand_name": "Eggland's Best",
            "serving_unit": "dozen",
            "weight": 1,
            "cost": 4.49,
            "pricePerUnit": 4.49,
            "totalCalories": 840,
            "totalProtein": 72,
            "totalFat": 60,
            "totalCarbs": 12,
            "date": "2026-10-19T14:03:11.250Z"
        }"#;
        let record: PurchaseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 1_760_882_591_250);
        assert_eq!(record.brand, "Eggland's Best");
        assert_eq!(record.category, DEFAULT_CATEGORY);
        assert_eq!(record.unit_label, "dozen");
        assert_eq!(record.quantity, 1.0);
        assert_eq!(record.total_calories, 840);
        assert_eq!(record.date(), "2026-10-19");
    }

    #[test]
    fn test_null_or_blank_category_is_groceries() {
        let base = serde_json::to_value(sample()).unwrap();
        for category in [serde_json::Value::Null, "".into(), "   ".into()] {
            let mut value = base.clone();
            value["category"] = category;
            let record: PurchaseRecord = serde_json::from_value(value).unwrap();
            assert_eq!(record.category, DEFAULT_CATEGORY);
        }

        let mut value = base;
        value["category"] = " Meat ".into();
        let record: PurchaseRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.category, "Meat");
    }

    #[test]
    fn test_serialize_uses_own_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("unit_label").is_some());
        assert!(value.get("serving_unit").is_none());
    }

    #[test]
    fn test_to_food_record_per_unit_nutrition() {
        let food = sample().to_food_record();
        assert_eq!(food.name, "Chicken Breast");
        assert_eq!(food.brand, "Perdue");
        assert_eq!(food.unit_labels(), vec!["lb"]);
        let per_unit = food.base_nutrition.resolve();
        assert_eq!(per_unit.calories, 748.0);
        assert_eq!(per_unit.protein, 140.0);
    }

    #[test]
    fn test_input_category_defaults() {
        let food = sample().to_food_record();
        let mut input = PurchaseInput::new(food, "lb", 1.0, 5.0);
        assert_eq!(input.category(), DEFAULT_CATEGORY);
        input.category = Some("  ".into());
        assert_eq!(input.category(), DEFAULT_CATEGORY);
        input.category = Some("Meat".into());
        assert_eq!(input.category(), "Meat");
    }
}
