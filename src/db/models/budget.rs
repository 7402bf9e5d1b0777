use crate::db::schema::budgethistory;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use rust_decimal::Decimal;
use travel_manager_api::BudgetHistoryEntryResponse;

/// The ledger lives in a single row of the `budget` table.
pub const LEDGER_ROW_ID: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentType {
    /// Balance replaced by an accountant
    Adjustment,
    /// Balance decremented by an approval
    Deduction,
}

impl AdjustmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adjustment => "Adjustment",
            Self::Deduction => "Deduction",
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = budgethistory)]
pub struct NewBudgetHistory<'a> {
    pub adjustment_type: &'a str,
    pub amount: Decimal,
    pub description: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = budgethistory)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BudgetHistory {
    pub id: i64,
    pub adjustment_type: String,
    pub amount: Decimal,
    pub description: String,
    pub update_timestamp: DateTime<Utc>,
}

impl From<BudgetHistory> for BudgetHistoryEntryResponse {
    fn from(row: BudgetHistory) -> Self {
        BudgetHistoryEntryResponse {
            id: row.id,
            adjustment_type: row.adjustment_type,
            amount: row.amount,
            description: row.description,
            update_timestamp: row.update_timestamp,
        }
    }
}
