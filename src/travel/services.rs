// src/travel/services.rs

use std::sync::Arc;

use diesel::Connection;
use rust_decimal::Decimal;
use travel_manager_api::{NotificationType, RequestStatus, Role, SubmitTravelRequest};
use uuid::Uuid;

use crate::auth::roles::Capability;
use crate::auth::session::SessionContext;
use crate::budget::ledger::{ApprovalOutcome, BudgetLedger, year_bounds};
use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::travel_request::{NewTravelRequest, TravelRequest};
use crate::db::repositories::faculty_repository::FacultyRepository;
use crate::db::repositories::travel_request_repository::TravelRequestRepository;
use crate::error::AppError;
use crate::notifications::services::{
    notify, pending_review_message, rejected_message, submitted_message,
};

pub const PURPOSE_OPTIONS: [&str; 2] = ["Attending a Conference", "Presenting at a Conference"];
pub const INDEX_OPTIONS: [&str; 7] = [
    "Scopus",
    "IEEE",
    "Web of Science",
    "PubMed",
    "MEDLINE",
    "ACM",
    "None",
];

pub const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

/// Largest cost component a `NUMERIC(12, 2)` column holds.
const MAX_COST_COMPONENT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2); // 999_999_999_999 / 10^2

/// Limite de pagination bornée à `[1, 500]`
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Checks a submission before anything is written.
pub fn validate_submission(payload: &SubmitTravelRequest) -> Result<(), AppError> {
    for (field, value) in [
        ("conference_name", &payload.conference_name),
        ("destination", &payload.destination),
        ("city", &payload.city),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::validation(format!("{field} is required")));
        }
    }

    if !PURPOSE_OPTIONS.contains(&payload.purpose_of_attending.as_str()) {
        return Err(AppError::validation(format!(
            "purpose_of_attending must be one of: {}",
            PURPOSE_OPTIONS.join(", ")
        )));
    }

    if let Some(index_type) = payload.index_type.as_deref()
        && !INDEX_OPTIONS.contains(&index_type)
    {
        return Err(AppError::validation(format!(
            "index_type must be one of: {}",
            INDEX_OPTIONS.join(", ")
        )));
    }

    if payload.date_from > payload.date_to {
        return Err(AppError::validation("date_from must not be after date_to"));
    }

    for (field, amount) in [
        ("per_diem", payload.per_diem),
        ("registration_fee", payload.registration_fee),
        ("visa_fee", payload.visa_fee),
    ] {
        if amount < Decimal::ZERO {
            return Err(AppError::validation(format!("{field} cannot be negative")));
        }
        if amount > MAX_COST_COMPONENT {
            return Err(AppError::validation(format!(
                "{field} cannot exceed {MAX_COST_COMPONENT}"
            )));
        }
        if amount.normalize().scale() > 2 {
            return Err(AppError::validation(format!(
                "{field} cannot have more than 2 decimal places"
            )));
        }
    }

    Ok(())
}

/// Une demande est visible par son auteur, ou par les rôles qui voient tout.
/// Les autres reçoivent la même réponse que pour un identifiant inconnu.
pub fn ensure_visible(request: TravelRequest, viewer: &SessionContext) -> Result<TravelRequest, AppError> {
    if request.faculty_user_id == viewer.user_id || viewer.can(Capability::ViewAllRequests) {
        Ok(request)
    } else {
        tracing::debug!(
            request_id = %request.request_id,
            user_id = %viewer.user_id,
            "Request hidden from non-owner"
        );
        Err(not_found(request.request_id))
    }
}

fn not_found(request_id: Uuid) -> AppError {
    AppError::not_found(format!("Travel request {request_id}"))
}

/// `%term%` for ILIKE, with `%`, `_` and `\` matched literally
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Submission, lookup and review of travel requests.
pub struct TravelRequestService {
    pool: DbPool,
    ledger: Arc<BudgetLedger>,
}

impl TravelRequestService {
    pub fn new(pool: DbPool, ledger: Arc<BudgetLedger>) -> Self {
        Self { pool, ledger }
    }

    /// Enregistre une nouvelle demande en statut `pending`
    pub fn submit(
        &self,
        faculty_user_id: &str,
        payload: SubmitTravelRequest,
    ) -> Result<TravelRequest, AppError> {
        validate_submission(&payload)?;

        let conference_name = payload.conference_name.trim().to_string();
        let mut conn = get_connection(&self.pool)?;

        if TravelRequestRepository::exists_for_conference(
            &mut conn,
            faculty_user_id,
            &conference_name,
            payload.date_from,
            payload.date_to,
        )? {
            return Err(AppError::duplicate(
                "A request for this conference and dates already exists",
            ));
        }

        let new_request = NewTravelRequest {
            request_id: Uuid::new_v4(),
            faculty_user_id: faculty_user_id.to_string(),
            conference_name,
            purpose_of_attending: payload.purpose_of_attending,
            conference_url: non_empty(payload.conference_url),
            destination: payload.destination.trim().to_string(),
            city: payload.city.trim().to_string(),
            date_from: payload.date_from,
            date_to: payload.date_to,
            per_diem: payload.per_diem,
            registration_fee: payload.registration_fee,
            visa_fee: payload.visa_fee,
            index_type: non_empty(payload.index_type),
            status: RequestStatus::Pending.as_str().to_string(),
        };

        let request = conn.transaction::<_, RepositoryError, _>(|conn| {
            let request = TravelRequestRepository::create(conn, &new_request)?;
            notify(
                conn,
                faculty_user_id,
                NotificationType::Info,
                submitted_message(&request.conference_name),
                request.request_id,
            )?;
            for approver in FacultyRepository::user_ids_with_role(conn, Role::Approval.as_str())? {
                notify(
                    conn,
                    &approver,
                    NotificationType::Info,
                    pending_review_message(&request.conference_name),
                    request.request_id,
                )?;
            }
            Ok(request)
        })?;
        tracing::info!(
            request_id = %request.request_id,
            faculty_user_id,
            total_cost = %request.total_cost(),
            "Travel request submitted"
        );
        Ok(request)
    }

    pub fn list_for_faculty(
        &self,
        faculty_user_id: &str,
        status: Option<RequestStatus>,
        limit: i64,
    ) -> Result<Vec<TravelRequest>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        Ok(TravelRequestRepository::find_by_faculty(
            &mut conn,
            faculty_user_id,
            status,
            limit,
        )?)
    }

    pub fn list_pending(&self, limit: i64) -> Result<Vec<TravelRequest>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        Ok(TravelRequestRepository::find_pending(&mut conn, limit)?)
    }

    pub fn get(&self, request_id: Uuid) -> Result<TravelRequest, AppError> {
        let mut conn = get_connection(&self.pool)?;
        TravelRequestRepository::find_by_id(&mut conn, request_id)?.ok_or_else(|| not_found(request_id))
    }

    /// `get` restricted to what `viewer` may see; a hidden request is a 404.
    pub fn get_for(&self, request_id: Uuid, viewer: &SessionContext) -> Result<TravelRequest, AppError> {
        ensure_visible(self.get(request_id)?, viewer)
    }

    /// Recherche plein texte simple, les plus récentes d'abord
    pub fn search(
        &self,
        term: &str,
        status: Option<RequestStatus>,
        limit: i64,
    ) -> Result<Vec<(TravelRequest, String, String)>, AppError> {
        let pattern = like_pattern(term);
        let mut conn = get_connection(&self.pool)?;
        let hits = TravelRequestRepository::search(&mut conn, &pattern, status, limit)?;
        tracing::debug!(term, ?status, hits = hits.len(), "Request search");
        Ok(hits)
    }

    /// Approuve une demande en débitant son coût total du budget
    pub fn approve(&self, request_id: Uuid, reviewer_id: &str) -> Result<ApprovalOutcome, AppError> {
        let request = self.get(request_id)?;
        let total_cost = request.total_cost();

        self.ledger
            .approve_request_and_deduct(request_id, total_cost, Some(reviewer_id))
    }

    /// Pending → rejected. No effect on the budget; the submitter is notified
    /// in the same transaction.
    pub fn reject(
        &self,
        request_id: Uuid,
        reviewer_id: &str,
        comments: Option<&str>,
    ) -> Result<TravelRequest, AppError> {
        let comments = comments.map(str::trim).filter(|c| !c.is_empty());
        let mut conn = get_connection(&self.pool)?;

        let rejected = conn.transaction::<_, RepositoryError, _>(|conn| {
            let updated = TravelRequestRepository::transition_from_pending(
                conn,
                request_id,
                RequestStatus::Rejected,
                Some(reviewer_id),
                comments,
            )?;
            if updated == 0 {
                return Ok(None);
            }

            let request = TravelRequestRepository::find_by_id(conn, request_id)?
                .ok_or_else(|| RepositoryError::NotFound(format!("Travel request {request_id}")))?;
            notify(
                conn,
                &request.faculty_user_id,
                NotificationType::Error,
                rejected_message(&request.conference_name, comments),
                request_id,
            )?;
            Ok(Some(request))
        })?;

        let Some(request) = rejected else {
            return Err(
                match TravelRequestRepository::status_of(&mut conn, request_id)? {
                    Some(status) => AppError::invalid_transition(format!(
                        "Request {request_id} is {status}, only pending requests can be rejected"
                    )),
                    None => not_found(request_id),
                },
            );
        };

        tracing::info!(%request_id, reviewer_id, "Travel request rejected");
        Ok(request)
    }

    /// Nombre de demandes par statut pour l'année, statuts absents à 0
    pub fn status_counts(&self, year: i32) -> Result<Vec<(RequestStatus, i64)>, AppError> {
        let (from, to) = year_bounds(year)?;
        let mut conn = get_connection(&self.pool)?;
        let rows = TravelRequestRepository::count_by_status_between(&mut conn, from, to)?;
        fill_status_counts(rows)
    }
}

fn fill_status_counts(rows: Vec<(String, i64)>) -> Result<Vec<(RequestStatus, i64)>, AppError> {
    let mut counts: Vec<(RequestStatus, i64)> =
        RequestStatus::ALL.iter().map(|s| (*s, 0)).collect();

    for (status, count) in rows {
        let status: RequestStatus = status.parse().map_err(AppError::internal)?;
        if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == status) {
            entry.1 = count;
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn payload() -> SubmitTravelRequest {
        SubmitTravelRequest {
            conference_name: "RustConf".to_string(),
            purpose_of_attending: "Presenting at a Conference".to_string(),
            conference_url: Some("https://rustconf.com".to_string()),
            destination: "USA".to_string(),
            city: "Chicago".to_string(),
            date_from: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            per_diem: Decimal::from(100),
            registration_fee: Decimal::from(500),
            visa_fee: Decimal::ZERO,
            index_type: Some("ACM".to_string()),
        }
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validate_submission(&payload()).is_ok());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let mut p = payload();
        p.city = "   ".to_string();
        let err = validate_submission(&p).unwrap_err();
        assert!(err.to_string().contains("city"));
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let mut p = payload();
        p.date_to = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert!(matches!(validate_submission(&p), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn single_day_trip_is_allowed() {
        let mut p = payload();
        p.date_to = p.date_from;
        assert!(validate_submission(&p).is_ok());
    }

    #[test]
    fn negative_fee_is_rejected() {
        let mut p = payload();
        p.visa_fee = Decimal::from(-10);
        let err = validate_submission(&p).unwrap_err();
        assert!(err.to_string().contains("visa_fee"));
    }

    #[test]
    fn unknown_purpose_and_index_are_rejected() {
        let mut p = payload();
        p.purpose_of_attending = "Vacation".to_string();
        assert!(validate_submission(&p).is_err());

        let mut p = payload();
        p.index_type = Some("Google Scholar".to_string());
        assert!(validate_submission(&p).is_err());

        let mut p = payload();
        p.index_type = None;
        assert!(validate_submission(&p).is_ok());
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_LIST_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIST_LIMIT);
        assert_eq!(clamp_limit(Some(20)), 20);
    }

    #[test]
    fn status_counts_include_missing_statuses() {
        let counts = fill_status_counts(vec![("approved".to_string(), 3)]).unwrap();
        assert_eq!(
            counts,
            vec![
                (RequestStatus::Pending, 0),
                (RequestStatus::Approved, 3),
                (RequestStatus::Rejected, 0),
            ]
        );
    }

    #[test]
    fn unknown_status_in_counts_is_an_internal_error() {
        assert!(matches!(
            fill_status_counts(vec![("completed".to_string(), 1)]),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[test]
    fn costs_must_fit_the_money_columns() {
        let mut p = payload();
        p.per_diem = Decimal::from(10_000_000_000_i64);
        let err = validate_submission(&p).unwrap_err();
        assert!(err.to_string().contains("per_diem"));

        let mut p = payload();
        p.registration_fee = Decimal::new(12_345, 3);
        assert!(matches!(validate_submission(&p), Err(AppError::ValidationError(_))));

        let mut p = payload();
        p.registration_fee = MAX_COST_COMPONENT;
        assert!(validate_submission(&p).is_ok());
    }

    fn viewer(user_id: &str, role: Role) -> SessionContext {
        let now = chrono::Utc::now();
        SessionContext {
            session_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: user_id.to_string(),
            role,
            ip_address: None,
            created_at: now,
            expires_at: now + chrono::Duration::minutes(30),
        }
    }

    fn request_of(owner: &str) -> TravelRequest {
        let p = payload();
        TravelRequest {
            request_id: Uuid::new_v4(),
            faculty_user_id: owner.to_string(),
            conference_name: p.conference_name,
            purpose_of_attending: p.purpose_of_attending,
            conference_url: None,
            destination: p.destination,
            city: p.city,
            date_from: p.date_from,
            date_to: p.date_to,
            per_diem: p.per_diem,
            registration_fee: p.registration_fee,
            visa_fee: p.visa_fee,
            index_type: None,
            status: "pending".to_string(),
            created_at: chrono::Utc::now(),
            reviewer_id: None,
            review_comments: None,
            reviewed_at: None,
        }
    }

    #[test]
    fn other_professors_requests_look_missing() {
        let request = request_of("prof.a");
        let request_id = request.request_id;

        let err = ensure_visible(request, &viewer("prof.b", Role::Professor)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            not_found(request_id).to_string(),
            "hidden and unknown requests must be indistinguishable"
        );
    }

    #[test]
    fn owner_and_reviewers_see_the_request() {
        assert!(ensure_visible(request_of("prof.a"), &viewer("prof.a", Role::Professor)).is_ok());
        assert!(ensure_visible(request_of("prof.a"), &viewer("acc", Role::Accountant)).is_ok());
        assert!(ensure_visible(request_of("prof.a"), &viewer("appr", Role::Approval)).is_ok());
    }

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern(" Berlin "), "%Berlin%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn blank_optionals_are_dropped() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" IEEE ".to_string())), Some("IEEE".to_string()));
    }
}
