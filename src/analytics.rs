//! Spending and nutrition analytics
//!
//! Everything here is derived from the ledger's records in one pass and
//! recomputed from scratch on each call.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::ledger::LedgerRevision;
use crate::models::{NutritionTotals, PurchaseRecord};

/// Number of most recent dates kept in the daily series
pub const TRAILING_DAYS: usize = 7;

/// Spend and nutrition for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    /// "YYYY-MM-DD"
    pub date: String,
    pub spend: f64,
    pub calories: i64,
    pub protein: i64,
    pub fat: i64,
    pub carbs: i64,
}

impl DailyPoint {
    /// Short axis label such as "Oct 19"; falls back to the raw date
    pub fn short_label(&self) -> String {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map(|d| d.format("%b %-d").to_string())
            .unwrap_or_else(|_| self.date.clone())
    }
}

/// One slice of the macro breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroShare {
    pub name: &'static str,
    pub grams: i64,
}

impl MacroShare {
    /// Share of `total` grams in percent, 0 when `total` is 0
    pub fn percent_of(&self, total: i64) -> f64 {
        if total > 0 {
            self.grams as f64 * 100.0 / total as f64
        } else {
            0.0
        }
    }
}

/// Derived view over the whole ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub record_count: usize,
    pub total_spend: f64,
    pub average_per_item: f64,
    pub total_calories: i64,
    pub total_protein: i64,
    pub total_fat: i64,
    pub total_carbs: i64,
    pub category_totals: BTreeMap<String, f64>,
    /// Ascending by date, at most [`TRAILING_DAYS`] entries
    pub daily_series: Vec<DailyPoint>,
    /// Always Protein, Fat, Carbs in that order
    pub macro_breakdown: Vec<MacroShare>,
}

impl AnalyticsSnapshot {
    /// Total grams across the macro breakdown
    pub fn macro_grams(&self) -> i64 {
        self.macro_breakdown.iter().map(|m| m.grams).sum()
    }
}

/// Compute totals, per-category spend, the trailing daily series and the
/// macro breakdown for `records`, in any order.
pub fn compute_analytics(records: &[PurchaseRecord]) -> AnalyticsSnapshot {
    let count = records.len();
    let total_spend: f64 = records.iter().map(|r| r.cost).sum();
    let average_per_item = if count > 0 {
        total_spend / count as f64
    } else {
        0.0
    };

    let totals: NutritionTotals = records.iter().map(PurchaseRecord::nutrition).sum();

    let mut category_totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        *category_totals.entry(record.category.clone()).or_insert(0.0) += record.cost;
    }

    AnalyticsSnapshot {
        record_count: count,
        total_spend,
        average_per_item,
        total_calories: totals.calories,
        total_protein: totals.protein,
        total_fat: totals.fat,
        total_carbs: totals.carbs,
        category_totals,
        daily_series: daily_series(records, TRAILING_DAYS),
        macro_breakdown: vec![
            MacroShare { name: "Protein", grams: totals.protein },
            MacroShare { name: "Fat", grams: totals.fat },
            MacroShare { name: "Carbs", grams: totals.carbs },
        ],
    }
}

/// Group records by date, sort ascending and keep the last `days` dates
pub fn daily_series(records: &[PurchaseRecord], days: usize) -> Vec<DailyPoint> {
    let mut by_date: BTreeMap<&str, (f64, NutritionTotals)> = BTreeMap::new();
    for record in records {
        let entry = by_date.entry(record.date()).or_default();
        entry.0 += record.cost;
        entry.1 = entry.1 + record.nutrition();
    }

    let skip = by_date.len().saturating_sub(days);
    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, (spend, n))| DailyPoint {
            date: date.to_string(),
            spend,
            calories: n.calories,
            protein: n.protein,
            fat: n.fat,
            carbs: n.carbs,
        })
        .collect()
}

/// Memoizes the snapshot for one revision of one ledger
#[derive(Debug, Default)]
pub struct AnalyticsCache {
    cached: Option<(LedgerRevision, AnalyticsSnapshot)>,
}

impl AnalyticsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for `records` at `revision`, recomputed only when the revision changes
    pub fn get(
        &mut self,
        revision: LedgerRevision,
        records: &[PurchaseRecord],
    ) -> &AnalyticsSnapshot {
        if matches!(&self.cached, Some((r, _)) if *r != revision) {
            self.cached = None;
        }
        let (_, snapshot) = self.cached.get_or_insert_with(|| {
            tracing::debug!(
                "Recomputing analytics for ledger {} revision {}",
                revision.instance,
                revision.count
            );
            (revision, compute_analytics(records))
        });
        snapshot
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
