//! Built-in unit catalog
//!
//! A small offline food table keyed by search keyword. Each food lists the
//! units it is commonly bought in, with multipliers relative to its base
//! serving. Used when no remote food database is configured, and in tests.

use async_trait::async_trait;

use super::{FoodLookup, LookupError};
use crate::models::{BaseNutrition, FoodKind, FoodRecord, FoodSummary, UnitOption};

const GENERIC_PREFIX: &str = "generic:";

/// Queries shorter than this get no generic fallback
const MIN_GENERIC_QUERY_LEN: usize = 3;

/// Foods registered under one search keyword
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub key: String,
    pub foods: Vec<FoodRecord>,
}

/// In-memory [`FoodLookup`] over a keyword table
#[derive(Debug, Clone)]
pub struct CatalogLookup {
    entries: Vec<CatalogEntry>,
}

impl Default for CatalogLookup {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CatalogLookup {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Register `food` under `key`, creating the keyword if needed
    pub fn insert(&mut self, key: &str, food: FoodRecord) {
        let key = key.to_lowercase();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.foods.push(food),
            None => self.entries.push(CatalogEntry {
                key,
                foods: vec![food],
            }),
        }
    }

    /// Keyword matches in either direction ("chick" and "chicken thighs" both
    /// match "chicken"). Unmatched queries of three or more characters yield a
    /// single generic food named after the query.
    fn matches(&self, query: &str) -> Vec<FoodSummary> {
        let lower = query.trim().to_lowercase();
        if lower.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        for entry in &self.entries {
            if entry.key.contains(&lower) || lower.contains(&entry.key) {
                for (index, food) in entry.foods.iter().enumerate() {
                    results.push(FoodSummary {
                        id: format!("{}:{}", entry.key, index),
                        name: food.name.clone(),
                        brand: Some(food.brand.clone()),
                        kind: FoodKind::Branded,
                    });
                }
            }
        }

        if results.is_empty() && query.trim().chars().count() >= MIN_GENERIC_QUERY_LEN {
            let name = query.trim().to_string();
            results.push(FoodSummary {
                id: format!("{GENERIC_PREFIX}{name}"),
                name,
                brand: None,
                kind: FoodKind::Common,
            });
        }

        results
    }

    fn details(&self, id: &str) -> Option<FoodRecord> {
        if let Some(name) = id.strip_prefix(GENERIC_PREFIX) {
            return Some(generic_food(name));
        }

        let (key, index) = id.rsplit_once(':')?;
        let index: usize = index.parse().ok()?;
        self.entries
            .iter()
            .find(|e| e.key == key)
            .and_then(|e| e.foods.get(index))
            .cloned()
    }

    /// The bundled grocery table
    pub fn builtin() -> Self {
        let mut catalog = Self { entries: Vec::new() };

        catalog.insert(
            "chicken",
            FoodRecord::new(
                "Chicken Breast",
                Some("Perdue".into()),
                BaseNutrition::new(748.0, 140.0, 16.0, 0.0),
                vec![
                    UnitOption::new("lb", 1.0).with_sizes(&["1 lb", "2 lbs", "3 lbs"]),
                    UnitOption::new("oz", 0.0625).with_sizes(&["8 oz", "16 oz", "24 oz"]),
                    UnitOption::new("breast", 0.5)
                        .with_sizes(&["2 breasts", "4 breasts", "6 breasts"]),
                ],
            ),
        );
        catalog.insert(
            "chicken",
            FoodRecord::new(
                "Rotisserie Chicken",
                Some("Costco".into()),
                BaseNutrition::new(1037.0, 143.0, 47.0, 0.0),
                vec![
                    UnitOption::new("whole chicken", 1.0).with_sizes(&["1 whole"]),
                    UnitOption::new("lb", 0.33).with_sizes(&["3 lbs"]),
                ],
            ),
        );
        catalog.insert(
            "milk",
            FoodRecord::new(
                "Whole Milk",
                Some("Organic Valley".into()),
                BaseNutrition::new(2400.0, 128.0, 128.0, 192.0),
                vec![
                    UnitOption::new("gallon", 1.0).with_sizes(&["1 gallon"]),
                    UnitOption::new("half gallon", 0.5).with_sizes(&["1/2 gallon"]),
                    UnitOption::new("quart", 0.25).with_sizes(&["1 quart"]),
                    UnitOption::new("cup", 0.0625).with_sizes(&["1 cup", "2 cups"]),
                ],
            ),
        );
        catalog.insert(
            "milk",
            FoodRecord::new(
                "Almond Milk",
                Some("Silk".into()),
                BaseNutrition::new(240.0, 8.0, 20.0, 16.0),
                vec![
                    UnitOption::new("half gallon", 1.0).with_sizes(&["64 oz"]),
                    UnitOption::new("quart", 0.5).with_sizes(&["32 oz"]),
                    UnitOption::new("cup", 0.03125).with_sizes(&["1 cup"]),
                ],
            ),
        );
        catalog.insert(
            "bread",
            FoodRecord::new(
                "Whole Wheat Bread",
                Some("Dave's Killer".into()),
                BaseNutrition::new(1980.0, 99.0, 27.0, 396.0),
                vec![
                    UnitOption::new("loaf", 1.0).with_sizes(&["1 loaf"]),
                    UnitOption::new("slice", 0.045).with_sizes(&["2 slices", "4 slices"]),
                ],
            ),
        );
        catalog.insert(
            "eggs",
            FoodRecord::new(
                "Large Eggs",
                Some("Eggland's Best".into()),
                BaseNutrition::new(840.0, 72.0, 60.0, 12.0),
                vec![
                    UnitOption::new("dozen", 1.0).with_sizes(&["1 dozen"]),
                    UnitOption::new("18-pack", 1.5).with_sizes(&["18 eggs"]),
                    UnitOption::new("egg", 0.083).with_sizes(&["1 egg", "2 eggs", "3 eggs"]),
                ],
            ),
        );
        catalog.insert(
            "apple",
            FoodRecord::new(
                "Gala Apples",
                Some("Organic Valley".into()),
                BaseNutrition::new(236.0, 1.0, 1.0, 63.0),
                vec![
                    UnitOption::new("lb", 1.0).with_sizes(&["3 lbs", "5 lbs"]),
                    UnitOption::new("apple", 0.33)
                        .with_sizes(&["1 apple", "3 apples", "6 apples"]),
                    UnitOption::new("bag", 3.0).with_sizes(&["3 lb bag", "5 lb bag"]),
                ],
            ),
        );
        catalog.insert(
            "banana",
            FoodRecord::new(
                "Organic Bananas",
                Some("Dole".into()),
                BaseNutrition::new(404.0, 5.0, 1.0, 103.0),
                vec![
                    UnitOption::new("lb", 1.0).with_sizes(&["2 lbs", "3 lbs"]),
                    UnitOption::new("banana", 0.26)
                        .with_sizes(&["1 banana", "3 bananas", "6 bananas"]),
                    UnitOption::new("bunch", 2.5).with_sizes(&["1 bunch"]),
                ],
            ),
        );
        catalog.insert(
            "steak",
            FoodRecord::new(
                "Ribeye Steak",
                Some("USDA Choice".into()),
                BaseNutrition::new(1137.0, 94.0, 83.0, 0.0),
                vec![
                    UnitOption::new("oz", 0.0625).with_sizes(&["8 oz", "12 oz", "16 oz"]),
                    UnitOption::new("lb", 1.0).with_sizes(&["0.75 lb", "1 lb", "1.5 lbs"]),
                    UnitOption::new("steak", 0.75).with_sizes(&["1 steak"]),
                ],
            ),
        );

        catalog
    }
}

/// Placeholder nutrition for foods the catalog does not know
fn generic_food(name: &str) -> FoodRecord {
    FoodRecord::new(
        name,
        None,
        BaseNutrition::new(100.0, 10.0, 5.0, 20.0),
        vec![
            UnitOption::serving(),
            UnitOption::new("lb", 1.0).with_sizes(&["1 lb"]),
            UnitOption::new("oz", 0.0625).with_sizes(&["8 oz", "16 oz"]),
        ],
    )
}

#[async_trait]
impl FoodLookup for CatalogLookup {
    async fn search(&self, query: &str) -> Result<Vec<FoodSummary>, LookupError> {
        Ok(self.matches(query))
    }

    async fn get_details(&self, summary: &FoodSummary) -> Result<FoodRecord, LookupError> {
        self.details(&summary.id)
            .ok_or_else(|| LookupError::UnknownFood(summary.id.clone()))
    }
}
