// src/budget/ledger.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use diesel::Connection;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::budget::{AdjustmentType, BudgetHistory};
use crate::db::models::travel_request::total_cost;
use crate::db::repositories::budget_repository::BudgetRepository;
use crate::db::repositories::travel_request_repository::TravelRequestRepository;
use crate::error::AppError;
use crate::notifications::services::{approved_message, notify};
use travel_manager_api::{NotificationType, RequestStatus};

pub const INSUFFICIENT_BUDGET: &str = "Insufficient budget";
pub const REQUEST_APPROVED: &str = "Request approved successfully";
const ADJUSTMENT_DESCRIPTION: &str = "Budget set or adjusted by accountant";

/// Largest value a `NUMERIC(14, 2)` ledger column holds.
pub const MAX_BUDGET_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2); // 99_999_999_999_999 / 10^2
const MONEY_SCALE: u32 = 2;

/// Result of an approval attempt. A refusal for lack of funds is a normal
/// outcome and leaves no trace in the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalOutcome {
    pub approved: bool,
    pub message: String,
}

impl ApprovalOutcome {
    fn approved() -> Self {
        Self {
            approved: true,
            message: REQUEST_APPROVED.to_string(),
        }
    }

    fn insufficient() -> Self {
        Self {
            approved: false,
            message: INSUFFICIENT_BUDGET.to_string(),
        }
    }
}

/// `(total_budget, total_expenses, remaining)` recomputed from approved requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingBudget {
    pub total_budget: Decimal,
    pub total_expenses: Decimal,
    pub remaining: Decimal,
}

/// The ledger balance next to the recomputed remaining budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub year: i32,
    pub funds_available: Decimal,
    pub recomputed: RemainingBudget,
    pub diverged: bool,
}

/// Why the approval transaction was rolled back.
#[derive(Debug)]
enum ApprovalAbort {
    Insufficient { available: Decimal },
    UnknownRequest,
    NotPending(String),
    Repository(RepositoryError),
}

impl From<diesel::result::Error> for ApprovalAbort {
    fn from(err: diesel::result::Error) -> Self {
        ApprovalAbort::Repository(err.into())
    }
}

impl From<RepositoryError> for ApprovalAbort {
    fn from(err: RepositoryError) -> Self {
        ApprovalAbort::Repository(err)
    }
}

/// Montant accepté par le ledger: positif, au plus 2 décimales, dans `NUMERIC(14, 2)`
pub fn validate_budget_amount(amount: Decimal) -> Result<(), AppError> {
    if amount < Decimal::ZERO {
        return Err(AppError::validation("Budget amount cannot be negative"));
    }
    if amount > MAX_BUDGET_AMOUNT {
        return Err(AppError::validation(format!(
            "Budget amount cannot exceed {MAX_BUDGET_AMOUNT}"
        )));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AppError::validation(
            "Budget amount cannot have more than 2 decimal places",
        ));
    }
    Ok(())
}

/// New balance after spending `cost`, or `None` when funds do not cover it.
pub fn balance_after(available: Decimal, cost: Decimal) -> Option<Decimal> {
    (available >= cost).then(|| available - cost)
}

pub fn deduction_description(request_id: Uuid) -> String {
    format!("Deduction for approved request ID {request_id}")
}

/// `[Jan 1 year, Jan 1 year+1)` in UTC.
pub fn year_bounds(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let start = |y: i32| {
        NaiveDate::from_ymd_opt(y, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or_else(|| AppError::invalid_input(format!("Invalid year: {y}")))
    };
    Ok((start(year)?, start(year + 1)?))
}

pub fn remaining_from(
    total_budget: Decimal,
    approved_costs: &[(Decimal, Decimal, Decimal)],
) -> RemainingBudget {
    let total_expenses = approved_costs
        .iter()
        .map(|&(per_diem, registration, visa)| total_cost(per_diem, registration, visa))
        .sum::<Decimal>();

    RemainingBudget {
        total_budget,
        total_expenses,
        remaining: total_budget - total_expenses,
    }
}

/// Available travel funds and their adjustment/deduction history.
pub struct BudgetLedger {
    pool: DbPool,
}

impl BudgetLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Remplace le solde disponible et trace un "Adjustment"
    pub fn set_budget(&self, amount: Decimal, modified_by: &str) -> Result<(), AppError> {
        validate_budget_amount(amount)?;

        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<_, RepositoryError, _>(|conn| {
            BudgetRepository::replace_funds(conn, amount)?;
            BudgetRepository::append_history(
                conn,
                AdjustmentType::Adjustment,
                amount,
                ADJUSTMENT_DESCRIPTION,
            )?;
            Ok(())
        })
        .inspect_err(|e| tracing::error!(error = %e, %amount, "Failed to set budget"))?;

        tracing::info!(%amount, modified_by, "Budget set");
        Ok(())
    }

    pub fn get_available_budget(&self) -> Result<Decimal, AppError> {
        let mut conn = get_connection(&self.pool)?;
        Ok(BudgetRepository::funds_available(&mut conn)?.unwrap_or(Decimal::ZERO))
    }

    /// Approves a pending request and deducts `total_cost`, all or nothing.
    ///
    /// The status change happens first, then the ledger row is read with
    /// `FOR UPDATE`; concurrent approvals therefore queue on that row and
    /// each one sees the balance left by the previous. When funds are short
    /// the whole transaction is rolled back, status change included.
    /// The submitter's notification is written in the same transaction.
    pub fn approve_request_and_deduct(
        &self,
        request_id: Uuid,
        total_cost: Decimal,
        reviewer_id: Option<&str>,
    ) -> Result<ApprovalOutcome, AppError> {
        if total_cost < Decimal::ZERO {
            return Err(AppError::invalid_input("Total cost cannot be negative"));
        }

        let mut conn = get_connection(&self.pool)?;
        let result = conn.transaction::<Decimal, ApprovalAbort, _>(|conn| {
            let updated = TravelRequestRepository::transition_from_pending(
                conn,
                request_id,
                RequestStatus::Approved,
                reviewer_id,
                None,
            )?;
            if updated == 0 {
                return Err(match TravelRequestRepository::status_of(conn, request_id)? {
                    Some(status) => ApprovalAbort::NotPending(status),
                    None => ApprovalAbort::UnknownRequest,
                });
            }
            let request = TravelRequestRepository::find_by_id(conn, request_id)?
                .ok_or(ApprovalAbort::UnknownRequest)?;

            let available =
                BudgetRepository::lock_funds_available(conn)?.unwrap_or(Decimal::ZERO);
            let Some(remaining) = balance_after(available, total_cost) else {
                return Err(ApprovalAbort::Insufficient { available });
            };

            if !total_cost.is_zero() {
                BudgetRepository::deduct(conn, total_cost)?;
                BudgetRepository::append_history(
                    conn,
                    AdjustmentType::Deduction,
                    total_cost,
                    &deduction_description(request_id),
                )?;
            }

            notify(
                conn,
                &request.faculty_user_id,
                NotificationType::Success,
                approved_message(&request.conference_name),
                request_id,
            )?;

            Ok(remaining)
        });

        match result {
            Ok(remaining) => {
                tracing::info!(%request_id, %total_cost, %remaining, "Request approved, budget deducted");
                Ok(ApprovalOutcome::approved())
            }
            Err(ApprovalAbort::Insufficient { available }) => {
                tracing::warn!(%request_id, %total_cost, %available, "Insufficient budget for request");
                Ok(ApprovalOutcome::insufficient())
            }
            Err(ApprovalAbort::UnknownRequest) => {
                Err(AppError::not_found(format!("Travel request {request_id}")))
            }
            Err(ApprovalAbort::NotPending(status)) => Err(AppError::invalid_transition(format!(
                "Request {request_id} is {status}, only pending requests can be approved"
            ))),
            Err(ApprovalAbort::Repository(e)) => {
                tracing::error!(%request_id, error = %e, "Approval transaction rolled back");
                Err(e.into())
            }
        }
    }

    /// `total_budget` is the most recent Adjustment; expenses are the approved
    /// requests created during `year` (current calendar year when `None`).
    /// Independent of `funds_available`.
    pub fn calculate_remaining_budget(&self, year: Option<i32>) -> Result<RemainingBudget, AppError> {
        let (from, to) = year_bounds(year.unwrap_or_else(|| Utc::now().year()))?;
        let mut conn = get_connection(&self.pool)?;

        let total_budget = BudgetRepository::latest_adjustment(&mut conn)?.unwrap_or(Decimal::ZERO);
        let costs = TravelRequestRepository::approved_costs_between(&mut conn, from, to)?;

        Ok(remaining_from(total_budget, &costs))
    }

    pub fn history(&self, limit: i64) -> Result<Vec<BudgetHistory>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        Ok(BudgetRepository::history(&mut conn, limit)?)
    }

    /// Compares both sources of "remaining budget". A divergence is reported
    /// and logged, never corrected.
    pub fn reconcile(&self, year: Option<i32>) -> Result<Reconciliation, AppError> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        let funds_available = self.get_available_budget()?;
        let recomputed = self.calculate_remaining_budget(Some(year))?;
        let diverged = funds_available != recomputed.remaining;

        if diverged {
            tracing::warn!(
                year,
                %funds_available,
                recomputed = %recomputed.remaining,
                "Ledger balance and recomputed remaining budget diverge"
            );
        }

        Ok(Reconciliation {
            year,
            funds_available,
            recomputed,
            diverged,
        })
    }
}


/// Ledger behaviour against a live Postgres with migrations applied.
/// Run with `DATABASE_URL=... cargo test -- --ignored`.
#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::db::connection::test_pool;
    use crate::db::models::faculty::NewFaculty;
    use crate::db::models::travel_request::NewTravelRequest;
    use crate::db::models::notification::Notification;
    use crate::db::repositories::faculty_repository::FacultyRepository;
    use crate::db::repositories::notification_repository::NotificationRepository;
    use crate::travel::services::TravelRequestService;
    use chrono::NaiveDate;
    use std::sync::{Arc, Barrier, Mutex, MutexGuard};

    // The ledger is a single shared row; these tests must not interleave.
    static LEDGER_LOCK: Mutex<()> = Mutex::new(());

    fn serial() -> MutexGuard<'static, ()> {
        LEDGER_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    struct Fixture {
        pool: DbPool,
        faculty_id: String,
    }

    impl Fixture {
        fn new() -> Self {
            let pool = test_pool();
            let faculty_id = format!("ledger_{}", Uuid::new_v4().simple());
            let mut conn = get_connection(&pool).unwrap();
            FacultyRepository::create(
                &mut conn,
                &NewFaculty {
                    user_id: faculty_id.clone(),
                    name: "Ledger Test".to_string(),
                    department: "CS".to_string(),
                    role: "professor".to_string(),
                    password_hash: "x".to_string(),
                },
            )
            .unwrap();
            Self { pool, faculty_id }
        }

        fn request(&self, cost: i64) -> Uuid {
            let mut conn = get_connection(&self.pool).unwrap();
            let request = TravelRequestRepository::create(
                &mut conn,
                &NewTravelRequest {
                    request_id: Uuid::new_v4(),
                    faculty_user_id: self.faculty_id.clone(),
                    conference_name: format!("Conf {}", Uuid::new_v4()),
                    purpose_of_attending: "Attending a Conference".to_string(),
                    conference_url: None,
                    destination: "USA".to_string(),
                    city: "Chicago".to_string(),
                    date_from: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
                    date_to: NaiveDate::from_ymd_opt(2026, 6, 2).unwrap(),
                    per_diem: Decimal::from(cost),
                    registration_fee: Decimal::ZERO,
                    visa_fee: Decimal::ZERO,
                    index_type: None,
                    status: RequestStatus::Pending.as_str().to_string(),
                },
            )
            .unwrap();
            request.request_id
        }

        fn status(&self, request_id: Uuid) -> String {
            let mut conn = get_connection(&self.pool).unwrap();
            TravelRequestRepository::status_of(&mut conn, request_id)
                .unwrap()
                .unwrap()
        }

        fn deductions_for(&self, request_id: Uuid) -> Vec<BudgetHistory> {
            let mut conn = get_connection(&self.pool).unwrap();
            BudgetRepository::history_matching(
                &mut conn,
                AdjustmentType::Deduction,
                &deduction_description(request_id),
            )
            .unwrap()
        }

        fn notifications(&self) -> Vec<Notification> {
            let mut conn = get_connection(&self.pool).unwrap();
            NotificationRepository::list_for_user(&mut conn, &self.faculty_id, true, 100).unwrap()
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            if let Ok(mut conn) = get_connection(&self.pool) {
                let _ = FacultyRepository::delete(&mut conn, &self.faculty_id);
            }
        }
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn set_budget_replaces_balance_and_logs_one_adjustment() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = BudgetLedger::new(fx.pool.clone());

        let before = ledger.history(1000).unwrap().len();
        ledger.set_budget(Decimal::from(5000), "acc").unwrap();

        assert_eq!(ledger.get_available_budget().unwrap(), Decimal::from(5000));
        let history = ledger.history(1000).unwrap();
        assert_eq!(history.len(), before + 1);
        assert_eq!(history[0].adjustment_type, "Adjustment");
        assert_eq!(history[0].amount, Decimal::from(5000));
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn insufficient_budget_rolls_back_the_status_change() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = BudgetLedger::new(fx.pool.clone());
        ledger.set_budget(Decimal::from(1000), "acc").unwrap();
        let request_id = fx.request(1500);

        let outcome = ledger
            .approve_request_and_deduct(request_id, Decimal::from(1500), Some("approver"))
            .unwrap();

        assert!(!outcome.approved);
        assert_eq!(outcome.message, INSUFFICIENT_BUDGET);
        assert_eq!(fx.status(request_id), "pending");
        assert_eq!(ledger.get_available_budget().unwrap(), Decimal::from(1000));
        assert!(fx.deductions_for(request_id).is_empty());
        assert!(fx.notifications().is_empty());
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn approval_deducts_and_appends_history() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = BudgetLedger::new(fx.pool.clone());
        ledger.set_budget(Decimal::from(1000), "acc").unwrap();
        let request_id = fx.request(400);

        let outcome = ledger
            .approve_request_and_deduct(request_id, Decimal::from(400), Some("approver"))
            .unwrap();

        assert!(outcome.approved);
        assert_eq!(outcome.message, REQUEST_APPROVED);
        assert_eq!(ledger.get_available_budget().unwrap(), Decimal::from(600));
        assert_eq!(fx.status(request_id), "approved");

        let deductions = fx.deductions_for(request_id);
        assert_eq!(deductions.len(), 1);
        assert_eq!(deductions[0].amount, Decimal::from(400));

        let notifications = fx.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].notification_type, "success");
        assert_eq!(notifications[0].related_id, Some(request_id));
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn rejection_leaves_the_budget_untouched() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = Arc::new(BudgetLedger::new(fx.pool.clone()));
        let service = TravelRequestService::new(fx.pool.clone(), Arc::clone(&ledger));
        ledger.set_budget(Decimal::from(1000), "acc").unwrap();
        let request_id = fx.request(300);

        let rejected = service
            .reject(request_id, "approver", Some("Not this year"))
            .unwrap();

        assert_eq!(rejected.status, "rejected");
        assert_eq!(ledger.get_available_budget().unwrap(), Decimal::from(1000));
        assert!(fx.deductions_for(request_id).is_empty());

        let notifications = fx.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].notification_type, "error");
        assert!(notifications[0].message.ends_with("Not this year"));
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn zero_cost_approval_writes_no_deduction() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = BudgetLedger::new(fx.pool.clone());
        ledger.set_budget(Decimal::from(1000), "acc").unwrap();
        let request_id = fx.request(0);

        let outcome = ledger
            .approve_request_and_deduct(request_id, Decimal::ZERO, Some("approver"))
            .unwrap();

        assert!(outcome.approved);
        assert_eq!(fx.status(request_id), "approved");
        assert_eq!(ledger.get_available_budget().unwrap(), Decimal::from(1000));
        assert!(fx.deductions_for(request_id).is_empty());
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn remaining_budget_counts_latest_adjustment_and_approved_requests_of_the_year() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = BudgetLedger::new(fx.pool.clone());
        ledger.set_budget(Decimal::from(800), "acc").unwrap();
        ledger.set_budget(Decimal::from(2000), "acc").unwrap();

        let before = ledger.calculate_remaining_budget(None).unwrap();
        let approved = fx.request(250);
        fx.request(999);
        assert!(ledger.approve_request_and_deduct(approved, Decimal::from(250), None).unwrap().approved);
        let after = ledger.calculate_remaining_budget(None).unwrap();

        assert_eq!(after.total_budget, Decimal::from(2000));
        assert_eq!(after.total_expenses - before.total_expenses, Decimal::from(250));
        assert_eq!(after.remaining, after.total_budget - after.total_expenses);

        // requests are created now, nothing falls in an old year
        let old_year = ledger.calculate_remaining_budget(Some(2000)).unwrap();
        assert_eq!(old_year.total_budget, Decimal::from(2000));
        assert_eq!(old_year.total_expenses, Decimal::ZERO);
        assert_eq!(old_year.remaining, Decimal::from(2000));
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn reconcile_reports_divergence_after_a_reset() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = BudgetLedger::new(fx.pool.clone());
        ledger.set_budget(Decimal::from(1000), "acc").unwrap();
        let request_id = fx.request(400);
        assert!(ledger.approve_request_and_deduct(request_id, Decimal::from(400), None).unwrap().approved);

        ledger.set_budget(Decimal::from(5000), "acc").unwrap();
        let reconciliation = ledger.reconcile(None).unwrap();

        assert_eq!(reconciliation.year, Utc::now().year());
        assert_eq!(reconciliation.funds_available, Decimal::from(5000));
        assert_eq!(reconciliation.recomputed.total_budget, Decimal::from(5000));
        assert!(reconciliation.recomputed.total_expenses >= Decimal::from(400));
        assert_eq!(
            reconciliation.recomputed.remaining,
            Decimal::from(5000) - reconciliation.recomputed.total_expenses
        );
        assert!(reconciliation.diverged);
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn approving_twice_is_an_invalid_transition() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = BudgetLedger::new(fx.pool.clone());
        ledger.set_budget(Decimal::from(1000), "acc").unwrap();
        let request_id = fx.request(100);

        assert!(ledger.approve_request_and_deduct(request_id, Decimal::from(100), None).unwrap().approved);
        assert!(matches!(
            ledger.approve_request_and_deduct(request_id, Decimal::from(100), None),
            Err(AppError::InvalidTransition(_))
        ));
        assert_eq!(ledger.get_available_budget().unwrap(), Decimal::from(900));
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn unknown_request_is_not_found() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = BudgetLedger::new(fx.pool.clone());

        assert!(matches!(
            ledger.approve_request_and_deduct(Uuid::new_v4(), Decimal::from(1), None),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn concurrent_approvals_cannot_overdraw() {
        let _guard = serial();
        let fx = Fixture::new();
        let ledger = Arc::new(BudgetLedger::new(fx.pool.clone()));
        ledger.set_budget(Decimal::from(1000), "acc").unwrap();
        let first = fx.request(600);
        let second = fx.request(600);

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [first, second]
            .into_iter()
            .map(|request_id| {
                let ledger = Arc::clone(&ledger);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    ledger
                        .approve_request_and_deduct(request_id, Decimal::from(600), None)
                        .unwrap()
                })
            })
            .collect();

        let outcomes: Vec<ApprovalOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(outcomes.iter().filter(|o| o.approved).count(), 1);
        assert_eq!(
            outcomes.iter().filter(|o| o.message == INSUFFICIENT_BUDGET).count(),
            1
        );
        assert_eq!(ledger.get_available_budget().unwrap(), Decimal::from(400));
    }
}
