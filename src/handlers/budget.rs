// src/handlers/budget.rs

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use std::sync::Arc;
use travel_manager_api::{
    BudgetHistoryEntryResponse, BudgetResponse, BudgetSummaryResponse, DepartmentSpendingResponse,
    ListQuery, SetBudgetRequest, YearQuery,
};

use super::run_blocking;
use crate::auth::roles::Capability;
use crate::auth::session::SessionContext;
use crate::budget::ledger::BudgetLedger;
use crate::error::AppError;
use crate::response::AppResponse;
use crate::travel::analytics::AnalyticsService;
use crate::travel::services::clamp_limit;

/// GET /budget
pub async fn get_budget(
    session: SessionContext,
    State(ledger): State<Arc<BudgetLedger>>,
) -> Result<AppResponse<BudgetResponse>, AppError> {
    session.require(Capability::ViewBudget)?;

    let funds_available = run_blocking(move || ledger.get_available_budget()).await?;
    Ok(AppResponse::ok(BudgetResponse { funds_available }))
}

/// PUT /budget
/// Remplace le solde disponible (pas d'ajout)
pub async fn set_budget(
    session: SessionContext,
    State(ledger): State<Arc<BudgetLedger>>,
    payload: Result<Json<SetBudgetRequest>, JsonRejection>,
) -> Result<AppResponse<BudgetResponse>, AppError> {
    session.require(Capability::ManageBudget)?;
    let Json(payload) = payload?;

    let funds_available = run_blocking(move || {
        ledger.set_budget(payload.amount, &session.user_id)?;
        ledger.get_available_budget()
    })
    .await?;

    Ok(AppResponse::ok(BudgetResponse { funds_available }))
}

/// GET /budget/history?limit=
pub async fn budget_history(
    session: SessionContext,
    State(ledger): State<Arc<BudgetLedger>>,
    Query(query): Query<ListQuery>,
) -> Result<AppResponse<Vec<BudgetHistoryEntryResponse>>, AppError> {
    session.require(Capability::ViewBudget)?;
    let limit = clamp_limit(query.limit);

    let history = run_blocking(move || ledger.history(limit)).await?;
    Ok(AppResponse::ok(history.into_iter().map(Into::into).collect()))
}

/// GET /budget/summary?year=
pub async fn budget_summary(
    session: SessionContext,
    State(ledger): State<Arc<BudgetLedger>>,
    Query(query): Query<YearQuery>,
) -> Result<AppResponse<BudgetSummaryResponse>, AppError> {
    session.require(Capability::ViewBudget)?;

    let reconciliation = run_blocking(move || ledger.reconcile(query.year)).await?;
    Ok(AppResponse::ok(BudgetSummaryResponse {
        year: reconciliation.year,
        funds_available: reconciliation.funds_available,
        total_budget: reconciliation.recomputed.total_budget,
        total_expenses: reconciliation.recomputed.total_expenses,
        remaining: reconciliation.recomputed.remaining,
        diverged: reconciliation.diverged,
    }))
}

/// GET /budget/spending
/// Dépenses approuvées par département
pub async fn department_spending(
    session: SessionContext,
    State(analytics): State<Arc<AnalyticsService>>,
) -> Result<AppResponse<Vec<DepartmentSpendingResponse>>, AppError> {
    session.require(Capability::ViewBudget)?;

    let totals = run_blocking(move || analytics.department_spending()).await?;
    Ok(AppResponse::ok(
        totals
            .into_iter()
            .map(|(department, total_expense)| DepartmentSpendingResponse {
                department,
                total_expense,
            })
            .collect(),
    ))
}
