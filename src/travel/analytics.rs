// src/travel/analytics.rs

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

use crate::budget::ledger::year_bounds;
use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::models::travel_request::total_cost;
use crate::db::repositories::travel_request_repository::TravelRequestRepository;
use crate::error::AppError;

pub const DEFAULT_TOP_DESTINATIONS: i64 = 5;
pub const DEFAULT_TOP_FACULTY: i64 = 10;
const MAX_TOP: i64 = 100;

/// Taille d'un classement, bornée à `[1, 100]`
pub fn top_limit(limit: Option<i64>, default: i64) -> usize {
    usize::try_from(limit.unwrap_or(default).clamp(1, MAX_TOP)).unwrap_or(1)
}

/// Requests per calendar month, January to December, empty months at 0.
pub fn monthly_counts(created: &[DateTime<Utc>]) -> Vec<(u32, i64)> {
    let mut counts: Vec<(u32, i64)> = (1..=12).map(|month| (month, 0)).collect();
    for at in created {
        if let Some(entry) = counts.get_mut(at.month0() as usize) {
            entry.1 += 1;
        }
    }
    counts
}

/// Highest count first, ties by name, at most `limit` rows.
pub fn top_destinations(mut rows: Vec<(String, i64)>, limit: usize) -> Vec<(String, i64)> {
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows.truncate(limit);
    rows
}

pub fn top_faculty(mut rows: Vec<(String, String, i64)>, limit: usize) -> Vec<(String, String, i64)> {
    rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.1.cmp(&b.1)));
    rows.truncate(limit);
    rows
}

/// Total approved cost per department, biggest spender first.
pub fn department_totals(
    rows: Vec<(String, Option<Decimal>, Option<Decimal>, Option<Decimal>)>,
) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = rows
        .into_iter()
        .map(|(department, per_diem, registration, visa)| {
            let total = total_cost(
                per_diem.unwrap_or_default(),
                registration.unwrap_or_default(),
                visa.unwrap_or_default(),
            );
            (department, total)
        })
        .collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    totals
}

/// Read-only dashboards over the travel requests.
pub struct AnalyticsService {
    pool: DbPool,
}

impl AnalyticsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn requests_by_month(&self, year: i32) -> Result<Vec<(u32, i64)>, AppError> {
        let (from, to) = year_bounds(year)?;
        let mut conn = get_connection(&self.pool)?;
        let created = TravelRequestRepository::created_between(&mut conn, from, to)?;
        Ok(monthly_counts(&created))
    }

    /// Destinations of pending and approved requests
    pub fn top_destinations(&self, limit: usize) -> Result<Vec<(String, i64)>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let rows = TravelRequestRepository::count_by_destination(&mut conn)?;
        Ok(top_destinations(rows, limit))
    }

    /// `(user_id, name, request_count)` of professors, most active first
    pub fn faculty_travel_frequency(&self, limit: usize) -> Result<Vec<(String, String, i64)>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let rows = TravelRequestRepository::count_by_professor(&mut conn)?;
        Ok(top_faculty(rows, limit))
    }

    pub fn department_spending(&self) -> Result<Vec<(String, Decimal)>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let rows = TravelRequestRepository::approved_costs_by_department(&mut conn)?;
        Ok(department_totals(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn on(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn monthly_counts_fill_every_month() {
        let counts = monthly_counts(&[on(1, 5), on(1, 20), on(3, 1), on(12, 31)]);
        assert_eq!(counts.len(), 12);
        assert_eq!(counts[0], (1, 2));
        assert_eq!(counts[1], (2, 0));
        assert_eq!(counts[2], (3, 1));
        assert_eq!(counts[11], (12, 1));
        assert_eq!(counts.iter().map(|(_, c)| c).sum::<i64>(), 4);
    }

    #[test]
    fn monthly_counts_without_requests_are_zero() {
        assert!(monthly_counts(&[]).iter().all(|(_, count)| *count == 0));
    }

    #[test]
    fn destinations_are_ranked_then_truncated() {
        let rows = vec![
            ("Japan".to_string(), 2),
            ("USA".to_string(), 5),
            ("Germany".to_string(), 2),
            ("Canada".to_string(), 1),
        ];
        assert_eq!(
            top_destinations(rows, 3),
            vec![
                ("USA".to_string(), 5),
                ("Germany".to_string(), 2),
                ("Japan".to_string(), 2),
            ]
        );
    }

    #[test]
    fn faculty_without_requests_stay_in_the_ranking() {
        let rows = vec![
            ("p1".to_string(), "Zoe".to_string(), 0),
            ("p2".to_string(), "Adam".to_string(), 3),
            ("p3".to_string(), "Bea".to_string(), 0),
        ];
        let ranked = top_faculty(rows, 10);
        assert_eq!(ranked[0].1, "Adam");
        assert_eq!(ranked[1].1, "Bea");
        assert_eq!(ranked[2].2, 0);
    }

    #[test]
    fn department_totals_sum_components_and_sort() {
        let rows = vec![
            (
                "Math".to_string(),
                Some(Decimal::from(100)),
                Some(Decimal::from(50)),
                None,
            ),
            (
                "Physics".to_string(),
                Some(Decimal::from(400)),
                Some(Decimal::ZERO),
                Some(Decimal::new(2550, 2)),
            ),
        ];
        assert_eq!(
            department_totals(rows),
            vec![
                ("Physics".to_string(), Decimal::new(42550, 2)),
                ("Math".to_string(), Decimal::from(150)),
            ]
        );
    }

    #[test]
    fn top_limit_is_bounded() {
        assert_eq!(top_limit(None, DEFAULT_TOP_DESTINATIONS), 5);
        assert_eq!(top_limit(Some(0), 5), 1);
        assert_eq!(top_limit(Some(10_000), 5), 100);
    }
}
