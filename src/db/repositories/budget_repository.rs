use crate::db::error::RepositoryError;
use crate::db::models::budget::{AdjustmentType, BudgetHistory, LEDGER_ROW_ID, NewBudgetHistory};
use crate::db::schema::{budget, budgethistory};
use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;

pub struct BudgetRepository;

impl BudgetRepository {
    pub fn funds_available(conn: &mut PgConnection) -> Result<Option<Decimal>, RepositoryError> {
        budget::table
            .filter(budget::budget_id.eq(LEDGER_ROW_ID))
            .select(budget::funds_available)
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// `SELECT funds_available ... FOR UPDATE`: holds the ledger row until the
    /// surrounding transaction ends.
    pub fn lock_funds_available(
        conn: &mut PgConnection,
    ) -> Result<Option<Decimal>, RepositoryError> {
        budget::table
            .filter(budget::budget_id.eq(LEDGER_ROW_ID))
            .select(budget::funds_available)
            .for_update()
            .get_result(conn)
            .optional()
            .map_err(Into::into)
    }

    /// Remplace le solde (insert ou update de la ligne unique)
    pub fn replace_funds(conn: &mut PgConnection, amount: Decimal) -> Result<(), RepositoryError> {
        let now = Utc::now();
        diesel::insert_into(budget::table)
            .values((
                budget::budget_id.eq(LEDGER_ROW_ID),
                budget::funds_available.eq(amount),
                budget::updated_at.eq(now),
            ))
            .on_conflict(budget::budget_id)
            .do_update()
            .set((
                budget::funds_available.eq(amount),
                budget::updated_at.eq(now),
            ))
            .execute(conn)?;
        Ok(())
    }

    pub fn deduct(conn: &mut PgConnection, amount: Decimal) -> Result<(), RepositoryError> {
        let updated = diesel::update(budget::table.filter(budget::budget_id.eq(LEDGER_ROW_ID)))
            .set((
                budget::funds_available.eq(budget::funds_available - amount),
                budget::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound("Budget row".to_string()));
        }
        Ok(())
    }

    pub fn append_history(
        conn: &mut PgConnection,
        adjustment_type: AdjustmentType,
        amount: Decimal,
        description: &str,
    ) -> Result<BudgetHistory, RepositoryError> {
        let row = NewBudgetHistory {
            adjustment_type: adjustment_type.as_str(),
            amount,
            description,
        };

        diesel::insert_into(budgethistory::table)
            .values(&row)
            .returning(BudgetHistory::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    /// Dernières lignes d'historique, les plus récentes d'abord
    pub fn history(conn: &mut PgConnection, limit: i64) -> Result<Vec<BudgetHistory>, RepositoryError> {
        budgethistory::table
            .order_by((budgethistory::update_timestamp.desc(), budgethistory::id.desc()))
            .limit(limit)
            .select(BudgetHistory::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn latest_adjustment(conn: &mut PgConnection) -> Result<Option<Decimal>, RepositoryError> {
        budgethistory::table
            .filter(budgethistory::adjustment_type.eq(AdjustmentType::Adjustment.as_str()))
            .order_by((budgethistory::update_timestamp.desc(), budgethistory::id.desc()))
            .select(budgethistory::amount)
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    #[cfg(test)]
    pub fn history_matching(
        conn: &mut PgConnection,
        adjustment_type: AdjustmentType,
        description: &str,
    ) -> Result<Vec<BudgetHistory>, RepositoryError> {
        budgethistory::table
            .filter(budgethistory::adjustment_type.eq(adjustment_type.as_str()))
            .filter(budgethistory::description.eq(description))
            .select(BudgetHistory::as_select())
            .load(conn)
            .map_err(Into::into)
    }
}
