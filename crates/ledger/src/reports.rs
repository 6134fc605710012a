//! Aggregate views over a user's transactions.

use serde::{Deserialize, Serialize};

/// All-time totals for one user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub total_income: i64,
    pub total_expense: i64,
    pub balance: i64,
    pub transaction_count: u64,
}

/// Totals and per-category breakdowns for one calendar month.
///
/// Category breakdowns are ordered by category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub total_income: i64,
    pub total_expense: i64,
    pub balance: i64,
    pub income_by_category: Vec<(String, i64)>,
    pub expenses_by_category: Vec<(String, i64)>,
    pub transaction_count: usize,
}
