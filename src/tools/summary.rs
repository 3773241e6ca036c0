//! Dashboard summary
//!
//! Everything the dashboard shows in one serializable response: headline
//! totals, the chart series, the macro split and the most recent purchases.

use serde::Serialize;

use crate::analytics::{AnalyticsCache, AnalyticsSnapshot};
use crate::build_info::BuildInfo;
use crate::db::LedgerStore;
use crate::ledger::Ledger;
use crate::models::PurchaseRecord;

/// One bar of the daily spend chart
#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub date: String,
    pub spend: f64,
    pub calories: i64,
}

/// One slice of the macro pie
#[derive(Debug, Clone, Serialize)]
pub struct MacroSlice {
    pub name: &'static str,
    pub grams: i64,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub build: BuildInfo,
    pub analytics: AnalyticsSnapshot,
    pub chart: Vec<ChartPoint>,
    pub macros: Vec<MacroSlice>,
    pub recent: Vec<PurchaseRecord>,
    pub persist_warning: Option<String>,
}

/// Build the dashboard for the current ledger state.
///
/// Analytics come from `cache`, so repeated calls between mutations do not
/// rescan the ledger.
pub fn dashboard_summary<S: LedgerStore>(
    ledger: &Ledger<S>,
    cache: &mut AnalyticsCache,
    recent_limit: usize,
) -> DashboardSummary {
    let analytics = cache.get(ledger.revision(), ledger.list()).clone();

    let chart = analytics
        .daily_series
        .iter()
        .map(|point| ChartPoint {
            label: point.short_label(),
            date: point.date.clone(),
            spend: point.spend,
            calories: point.calories,
        })
        .collect();

    let macro_total = analytics.macro_grams();
    let macros = analytics
        .macro_breakdown
        .iter()
        .map(|share| MacroSlice {
            name: share.name,
            grams: share.grams,
            percent: share.percent_of(macro_total),
        })
        .collect();

    DashboardSummary {
        build: BuildInfo::current(),
        chart,
        macros,
        recent: ledger.list().iter().take(recent_limit).cloned().collect(),
        persist_warning: ledger.persist_warning().map(str::to_string),
        analytics,
    }
}
