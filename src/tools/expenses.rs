//! Expense tools
//!
//! Presentation-facing wrappers around the ledger. Responses serialize to JSON
//! and errors are user-facing strings. A stale id on update or delete is not an
//! error: it comes back as `success: false` and nothing changes.

use serde::Serialize;

use crate::db::LedgerStore;
use crate::ledger::{Ledger, LedgerError};
use crate::models::{FoodRecord, PurchaseInput, PurchaseRecord};
use crate::nutrition::{compute_nutrition, servings_for};

/// Response for add_expense and update_expense
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub success: bool,
    pub expense: Option<PurchaseRecord>,
    pub message: Option<String>,
    /// Set when the change was applied but could not be saved
    pub warning: Option<String>,
}

/// Response for delete_expense
#[derive(Debug, Serialize)]
pub struct DeleteExpenseResponse {
    pub success: bool,
    pub deleted_id: u64,
    pub message: Option<String>,
    pub warning: Option<String>,
}

/// Response for list_expenses
#[derive(Debug, Serialize)]
pub struct ListExpensesResponse {
    pub expenses: Vec<PurchaseRecord>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Live nutrition preview before submitting a purchase
#[derive(Debug, Serialize)]
pub struct NutritionPreview {
    pub unit_label: String,
    pub quantity: f64,
    pub servings: f64,
    pub calories: i64,
    pub protein: i64,
    pub fat: i64,
    pub carbs: i64,
    pub unit_price: Option<f64>,
}

fn stale(id: u64) -> String {
    format!("Purchase {} no longer exists; nothing was changed", id)
}

/// Log a new purchase
pub fn add_expense<S: LedgerStore>(
    ledger: &mut Ledger<S>,
    input: &PurchaseInput,
) -> Result<ExpenseResponse, String> {
    let record = ledger.add(input).map_err(|e| e.to_string())?;

    Ok(ExpenseResponse {
        success: true,
        expense: Some(record),
        message: None,
        warning: ledger.persist_warning().map(str::to_string),
    })
}

/// Replace a purchase
pub fn update_expense<S: LedgerStore>(
    ledger: &mut Ledger<S>,
    id: u64,
    input: &PurchaseInput,
) -> Result<ExpenseResponse, String> {
    match ledger.update(id, input) {
        Ok(record) => Ok(ExpenseResponse {
            success: true,
            expense: Some(record),
            message: None,
            warning: ledger.persist_warning().map(str::to_string),
        }),
        Err(LedgerError::NotFound(id)) => {
            tracing::warn!("Update of missing purchase {}", id);
            Ok(ExpenseResponse {
                success: false,
                expense: None,
                message: Some(stale(id)),
                warning: None,
            })
        }
        Err(e) => Err(e.to_string()),
    }
}

/// Delete a purchase
pub fn delete_expense<S: LedgerStore>(
    ledger: &mut Ledger<S>,
    id: u64,
) -> Result<DeleteExpenseResponse, String> {
    match ledger.remove(id) {
        Ok(()) => Ok(DeleteExpenseResponse {
            success: true,
            deleted_id: id,
            message: None,
            warning: ledger.persist_warning().map(str::to_string),
        }),
        Err(LedgerError::NotFound(id)) => {
            tracing::warn!("Delete of missing purchase {}", id);
            Ok(DeleteExpenseResponse {
                success: false,
                deleted_id: id,
                message: Some(stale(id)),
                warning: None,
            })
        }
        Err(e) => Err(e.to_string()),
    }
}

/// Page through purchases, newest first
pub fn list_expenses<S: LedgerStore>(
    ledger: &Ledger<S>,
    limit: usize,
    offset: usize,
) -> ListExpensesResponse {
    let limit = limit.clamp(1, 500);
    let expenses = ledger
        .list()
        .iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    ListExpensesResponse {
        expenses,
        total: ledger.len(),
        limit,
        offset,
    }
}

/// Nutrition (and unit price, if a cost is known) for a prospective purchase
pub fn preview_nutrition(
    food: &FoodRecord,
    quantity: f64,
    unit_label: &str,
    cost: Option<f64>,
) -> Result<NutritionPreview, String> {
    let servings = servings_for(food, quantity, unit_label).map_err(|e| e.to_string())?;
    let totals = compute_nutrition(food, quantity, unit_label).map_err(|e| e.to_string())?;

    Ok(NutritionPreview {
        unit_label: unit_label.to_string(),
        quantity,
        servings,
        calories: totals.calories,
        protein: totals.protein,
        fat: totals.fat,
        carbs: totals.carbs,
        unit_price: cost.filter(|c| c.is_finite() && *c >= 0.0).map(|c| c / quantity),
    })
}
