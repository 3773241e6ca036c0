//! Remote food database client
//!
//! Talks to a Nutritionix-compatible REST API:
//! - `GET  {base}/search/instant?query=...` for candidates
//! - `POST {base}/natural/nutrients` for common foods
//! - `GET  {base}/search/item?nix_item_id=...` for branded foods
//!
//! Remote foods describe nutrition per "serving" (`serving_qty` x
//! `serving_unit`, weighing `serving_weight_grams`). That serving is the base
//! serving; `alt_measures` and standard weight units are translated into unit
//! options relative to it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{FoodLookup, LookupError, DEFAULT_LOOKUP_TIMEOUT};
use crate::models::{BaseNutrition, FoodKind, FoodRecord, FoodSummary, UnitOption};
use crate::nutrition::{merge_units, weight_unit_options};

/// Client configuration
#[derive(Debug, Clone)]
pub struct HttpLookupConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_key: String,
    /// Bound on each HTTP request
    pub timeout: Duration,
    /// How long fetched details stay cached
    pub cache_ttl: Duration,
}

impl Default for HttpLookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://trackapi.nutritionix.com/v2".to_string(),
            app_id: String::new(),
            app_key: String::new(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
            cache_ttl: Duration::from_secs(86400), // 24 hours
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct InstantResponse {
    #[serde(default)]
    common: Vec<CommonHit>,
    #[serde(default)]
    branded: Vec<BrandedHit>,
}

#[derive(Debug, Deserialize)]
struct CommonHit {
    food_name: String,
}

#[derive(Debug, Deserialize)]
struct BrandedHit {
    food_name: String,
    brand_name: Option<String>,
    nix_item_id: String,
}

#[derive(Debug, Deserialize)]
struct FoodsResponse {
    #[serde(default)]
    foods: Vec<NixFood>,
}

#[derive(Debug, Deserialize)]
struct NixFood {
    food_name: String,
    brand_name: Option<String>,
    serving_qty: Option<f64>,
    serving_unit: Option<String>,
    serving_weight_grams: Option<f64>,
    nf_calories: Option<f64>,
    nf_protein: Option<f64>,
    nf_total_fat: Option<f64>,
    nf_total_carbohydrate: Option<f64>,
    #[serde(default)]
    alt_measures: Option<Vec<AltMeasure>>,
}

#[derive(Debug, Deserialize)]
struct AltMeasure {
    serving_weight: f64,
    measure: String,
    qty: f64,
}

/// Translate a remote food into a record with a complete unit catalog
fn food_record_from_nix(food: NixFood) -> FoodRecord {
    let base_nutrition = BaseNutrition {
        calories: food.nf_calories,
        protein: food.nf_protein,
        fat: food.nf_total_fat,
        carbs: food.nf_total_carbohydrate,
    };

    let serving_qty = food.serving_qty.filter(|q| q.is_finite() && *q > 0.0).unwrap_or(1.0);
    let serving_grams = food
        .serving_weight_grams
        .filter(|g| g.is_finite() && *g > 0.0);

    let mut units = Vec::new();

    // The serving unit itself: one count is 1/serving_qty of a base serving
    if let Some(label) = food.serving_unit.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        let typical = format!("{} {}", serving_qty, label);
        units.push(UnitOption::new(label, 1.0 / serving_qty).with_sizes(&[typical.as_str()]));
    }

    if let Some(grams) = serving_grams {
        let alt = food
            .alt_measures
            .unwrap_or_default()
            .into_iter()
            .filter(|m| m.qty > 0.0 && m.serving_weight > 0.0 && !m.measure.trim().is_empty())
            .map(|m| UnitOption::new(m.measure.trim(), (m.serving_weight / m.qty) / grams))
            .collect();
        merge_units(&mut units, alt);
        merge_units(&mut units, weight_unit_options(grams));
    }

    FoodRecord::new(food.food_name, food.brand_name, base_nutrition, units)
}

fn summaries_from_instant(response: InstantResponse) -> Vec<FoodSummary> {
    let branded = response.branded.into_iter().map(|hit| FoodSummary {
        id: hit.nix_item_id,
        name: hit.food_name,
        brand: hit.brand_name,
        kind: FoodKind::Branded,
    });
    let common = response.common.into_iter().map(|hit| FoodSummary {
        id: hit.food_name.clone(),
        name: hit.food_name,
        brand: None,
        kind: FoodKind::Common,
    });
    common.chain(branded).collect()
}

// ============================================================================
// Client
// ============================================================================

struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

/// HTTP-backed [`FoodLookup`]
pub struct HttpFoodLookup {
    config: HttpLookupConfig,
    http_client: reqwest::Client,
    details_cache: Arc<RwLock<HashMap<String, CacheEntry<FoodRecord>>>>,
}

impl HttpFoodLookup {
    pub fn new(config: HttpLookupConfig) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http_client,
            details_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("x-app-id", &self.config.app_id)
            .header("x-app-key", &self.config.app_key)
    }

    fn map_send_error(&self, e: reqwest::Error) -> LookupError {
        if e.is_timeout() {
            LookupError::TimedOut(self.config.timeout)
        } else {
            LookupError::Request(e)
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, LookupError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))
    }

    async fn cached(&self, id: &str) -> Option<FoodRecord> {
        let cache = self.details_cache.read().await;
        cache
            .get(id)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.data.clone())
    }

    /// Cache `record` under `id`, evicting expired entries first
    async fn remember(&self, id: &str, record: FoodRecord) {
        let now = Instant::now();
        let mut cache = self.details_cache.write().await;
        cache.retain(|_, entry| now < entry.expires_at);
        cache.insert(
            id.to_string(),
            CacheEntry {
                data: record,
                expires_at: now + self.config.cache_ttl,
            },
        );
    }

    /// Drop all cached details
    pub async fn clear_cache(&self) {
        self.details_cache.write().await.clear();
    }
}

#[async_trait]
impl FoodLookup for HttpFoodLookup {
    async fn search(&self, query: &str) -> Result<Vec<FoodSummary>, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let request = self
            .http_client
            .get(self.url("search/instant"))
            .query(&[("query", query)]);
        let response: InstantResponse = self.send(request).await?;

        let results = summaries_from_instant(response);
        tracing::debug!("Lookup for '{}' returned {} candidate(s)", query, results.len());
        Ok(results)
    }

    async fn get_details(&self, summary: &FoodSummary) -> Result<FoodRecord, LookupError> {
        if let Some(record) = self.cached(&summary.id).await {
            return Ok(record);
        }

        let request = match summary.kind {
            FoodKind::Branded => self
                .http_client
                .get(self.url("search/item"))
                .query(&[("nix_item_id", summary.id.as_str())]),
            FoodKind::Common => self
                .http_client
                .post(self.url("natural/nutrients"))
                .json(&serde_json::json!({ "query": summary.id })),
        };
        let response: FoodsResponse = self.send(request).await?;

        let food = response
            .foods
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::UnknownFood(summary.id.clone()))?;
        let record = food_record_from_nix(food);

        self.remember(&summary.id, record.clone()).await;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::compute_nutrition;

    const APPLE: &str = r#"{
        "foods": [{
            "food_name": "apple",
            "brand_name": null,
            "serving_qty": 1,
            "serving_unit": "medium (3\" dia)",
            "serving_weight_grams": 182,
            "nf_calories": 94.64,
            "nf_total_fat": 0.31,
            "nf_total_carbohydrate": 25.13,
            "nf_protein": 0.47,
            "alt_measures": [
                {"serving_weight": 182, "measure": "medium (3\" dia)", "seq": 2, "qty": 1},
                {"serving_weight": 125, "measure": "cup, sliced", "seq": 5, "qty": 1},
                {"serving_weight": 100, "measure": "g", "seq": null, "qty": 100}
            ]
        }]
    }"#;

    fn apple() -> FoodRecord {
        let response: FoodsResponse = serde_json::from_str(APPLE).unwrap();
        food_record_from_nix(response.foods.into_iter().next().unwrap())
    }

    #[test]
    fn test_serving_unit_is_default() {
        let record = apple();
        assert_eq!(record.name, "apple");
        assert_eq!(record.brand, "Generic");
        let default = record.default_unit().unwrap();
        assert_eq!(default.label, "medium (3\" dia)");
        assert_eq!(default.multiplier, 1.0);
    }

    #[test]
    fn test_alt_measures_become_units() {
        let record = apple();
        let sliced = record.unit("cup, sliced").unwrap();
        assert!((sliced.multiplier - 125.0 / 182.0).abs() < 1e-12);

        let gram = record.unit("g").unwrap();
        assert!((gram.multiplier - 1.0 / 182.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_units_added_without_duplicates() {
        let record = apple();
        let labels = record.unit_labels();
        assert_eq!(labels.iter().filter(|l| **l == "g").count(), 1);
        assert!(labels.contains(&"lb"));
        assert!(labels.contains(&"oz"));

        // 1 lb of 182 g apples
        let totals = compute_nutrition(&record, 1.0, "lb").unwrap();
        assert_eq!(totals.calories, 236);
    }

    #[test]
    fn test_serving_qty_scales_serving_unit() {
        let json = r#"{
            "food_name": "bread",
            "brand_name": "Dave's Killer Bread",
            "serving_qty": 2,
            "serving_unit": "slice",
            "serving_weight_grams": 90,
            "nf_calories": 220
        }"#;
        let record = food_record_from_nix(serde_json::from_str(json).unwrap());
        let slice = record.unit("slice").unwrap();
        assert_eq!(slice.multiplier, 0.5);
        assert_eq!(compute_nutrition(&record, 4.0, "slice").unwrap().calories, 440);
    }

    #[test]
    fn test_sparse_food_falls_back_to_serving() {
        let json = r#"{"food_name": "mystery"}"#;
        let record = food_record_from_nix(serde_json::from_str(json).unwrap());
        assert_eq!(record.unit_labels(), vec!["serving"]);
        assert_eq!(compute_nutrition(&record, 2.0, "serving").unwrap().calories, 0);
    }

    #[test]
    fn test_instant_summaries() {
        let json = r#"{
            "common": [{"food_name": "chicken breast", "tag_id": "4025"}],
            "branded": [{
                "food_name": "Chicken Breast",
                "brand_name": "Perdue",
                "nix_item_id": "5a1b2c",
                "nf_calories": 120
            }]
        }"#;
        let response: InstantResponse = serde_json::from_str(json).unwrap();
        let summaries = summaries_from_instant(response);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].kind, FoodKind::Common);
        assert_eq!(summaries[0].id, "chicken breast");
        assert_eq!(summaries[1].id, "5a1b2c");
        assert_eq!(summaries[1].brand.as_deref(), Some("Perdue"));
    }

    #[test]
    fn test_instant_empty_sections() {
        let response: InstantResponse = serde_json::from_str("{}").unwrap();
        assert!(summaries_from_instant(response).is_empty());
    }

    #[test]
    fn test_url_joining() {
        let lookup = HttpFoodLookup::new(HttpLookupConfig {
            base_url: "http://localhost:9/v2/".into(),
            ..HttpLookupConfig::default()
        })
        .unwrap();
        assert_eq!(lookup.url("search/instant"), "http://localhost:9/v2/search/instant");
    }

    #[tokio::test]
    async fn test_blank_search_skips_network() {
        let lookup = HttpFoodLookup::new(HttpLookupConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..HttpLookupConfig::default()
        })
        .unwrap();
        assert!(lookup.search("  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_details_evicted_on_insert() {
        let lookup = HttpFoodLookup::new(HttpLookupConfig {
            cache_ttl: Duration::ZERO,
            ..HttpLookupConfig::default()
        })
        .unwrap();

        lookup.remember("apple", apple()).await;
        lookup.remember("pear", apple()).await;
        assert_eq!(lookup.details_cache.read().await.len(), 1);
        assert!(lookup.cached("pear").await.is_none());
    }

    #[tokio::test]
    async fn test_fresh_details_served_from_cache() {
        let lookup = HttpFoodLookup::new(HttpLookupConfig::default()).unwrap();
        lookup.remember("apple", apple()).await;
        lookup.remember("pear", apple()).await;
        assert_eq!(lookup.details_cache.read().await.len(), 2);
        assert_eq!(lookup.cached("apple").await.unwrap().name, "apple");

        lookup.clear_cache().await;
        assert!(lookup.cached("apple").await.is_none());
    }
}
