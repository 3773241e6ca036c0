//! Ledger tools
//!
//! JSON-friendly operations over the ledger for the dashboard and the CLI.

pub mod expenses;
pub mod summary;

pub use expenses::{
    add_expense, delete_expense, list_expenses, preview_nutrition, update_expense,
    DeleteExpenseResponse, ExpenseResponse, ListExpensesResponse, NutritionPreview,
};
pub use summary::{dashboard_summary, ChartPoint, DashboardSummary, MacroSlice};
