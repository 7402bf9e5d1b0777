use crate::db::error::RepositoryError;
use crate::db::models::travel_request::{NewTravelRequest, TravelRequest};
use crate::db::schema::{faculty, requests};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use travel_manager_api::RequestStatus;
use uuid::Uuid;

pub struct TravelRequestRepository;

impl TravelRequestRepository {
    pub fn create(
        conn: &mut PgConnection,
        new_request: &NewTravelRequest,
    ) -> Result<TravelRequest, RepositoryError> {
        diesel::insert_into(requests::table)
            .values(new_request)
            .returning(TravelRequest::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn find_by_id(
        conn: &mut PgConnection,
        request_id: Uuid,
    ) -> Result<Option<TravelRequest>, RepositoryError> {
        requests::table
            .filter(requests::request_id.eq(request_id))
            .select(TravelRequest::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// Même conférence, mêmes dates, même demandeur
    pub fn exists_for_conference(
        conn: &mut PgConnection,
        faculty_user_id: &str,
        conference_name: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        diesel::select(diesel::dsl::exists(
            requests::table
                .filter(requests::faculty_user_id.eq(faculty_user_id))
                .filter(requests::conference_name.eq(conference_name))
                .filter(requests::date_from.eq(date_from))
                .filter(requests::date_to.eq(date_to)),
        ))
        .get_result(conn)
        .map_err(Into::into)
    }

    pub fn find_by_faculty(
        conn: &mut PgConnection,
        faculty_user_id: &str,
        status: Option<RequestStatus>,
        limit: i64,
    ) -> Result<Vec<TravelRequest>, RepositoryError> {
        let mut query = requests::table
            .filter(requests::faculty_user_id.eq(faculty_user_id))
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(requests::status.eq(status.as_str()));
        }

        query
            .order_by(requests::created_at.desc())
            .limit(limit)
            .select(TravelRequest::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    /// Demandes en attente, les plus anciennes d'abord
    pub fn find_pending(conn: &mut PgConnection, limit: i64) -> Result<Vec<TravelRequest>, RepositoryError> {
        requests::table
            .filter(requests::status.eq(RequestStatus::Pending.as_str()))
            .order_by(requests::created_at.asc())
            .limit(limit)
            .select(TravelRequest::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    /// Moves a request out of `pending`. Returns the number of rows touched,
    /// 0 when the request is unknown or no longer pending.
    pub fn transition_from_pending(
        conn: &mut PgConnection,
        request_id: Uuid,
        to: RequestStatus,
        reviewer_id: Option<&str>,
        comments: Option<&str>,
    ) -> Result<usize, RepositoryError> {
        diesel::update(
            requests::table
                .filter(requests::request_id.eq(request_id))
                .filter(requests::status.eq(RequestStatus::Pending.as_str())),
        )
        .set((
            requests::status.eq(to.as_str()),
            requests::reviewer_id.eq(reviewer_id),
            requests::review_comments.eq(comments),
            requests::reviewed_at.eq(Some(Utc::now())),
        ))
        .execute(conn)
        .map_err(Into::into)
    }

    pub fn status_of(conn: &mut PgConnection, request_id: Uuid) -> Result<Option<String>, RepositoryError> {
        requests::table
            .filter(requests::request_id.eq(request_id))
            .select(requests::status)
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// Cost components of the approved requests created in `[from, to)`.
    pub fn approved_costs_between(
        conn: &mut PgConnection,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(Decimal, Decimal, Decimal)>, RepositoryError> {
        requests::table
            .filter(requests::status.eq(RequestStatus::Approved.as_str()))
            .filter(requests::created_at.ge(from))
            .filter(requests::created_at.lt(to))
            .select((
                requests::per_diem,
                requests::registration_fee,
                requests::visa_fee,
            ))
            .load(conn)
            .map_err(Into::into)
    }

    /// Case-insensitive match of `pattern` (already a LIKE pattern) on the
    /// conference name, the submitter's name, the destination or the city.
    /// Newest first, with the submitter's name and department.
    pub fn search(
        conn: &mut PgConnection,
        pattern: &str,
        status: Option<RequestStatus>,
        limit: i64,
    ) -> Result<Vec<(TravelRequest, String, String)>, RepositoryError> {
        let mut query = requests::table
            .inner_join(faculty::table)
            .filter(
                requests::conference_name
                    .ilike(pattern)
                    .or(faculty::name.ilike(pattern))
                    .or(requests::destination.ilike(pattern))
                    .or(requests::city.ilike(pattern)),
            )
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(requests::status.eq(status.as_str()));
        }

        query
            .order_by(requests::created_at.desc())
            .limit(limit)
            .select((TravelRequest::as_select(), faculty::name, faculty::department))
            .load(conn)
            .map_err(Into::into)
    }

    /// Creation times of every request in `[from, to)`, any status.
    pub fn created_between(
        conn: &mut PgConnection,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        requests::table
            .filter(requests::created_at.ge(from))
            .filter(requests::created_at.lt(to))
            .select(requests::created_at)
            .load(conn)
            .map_err(Into::into)
    }

    /// Requests per destination, rejected ones excluded.
    pub fn count_by_destination(conn: &mut PgConnection) -> Result<Vec<(String, i64)>, RepositoryError> {
        requests::table
            .filter(requests::status.ne(RequestStatus::Rejected.as_str()))
            .group_by(requests::destination)
            .select((requests::destination, diesel::dsl::count_star()))
            .load(conn)
            .map_err(Into::into)
    }

    /// Every professor with the number of requests they submitted, 0 included.
    pub fn count_by_professor(
        conn: &mut PgConnection,
    ) -> Result<Vec<(String, String, i64)>, RepositoryError> {
        faculty::table
            .left_join(requests::table)
            .filter(faculty::role.eq("professor"))
            .group_by((faculty::user_id, faculty::name))
            .select((
                faculty::user_id,
                faculty::name,
                diesel::dsl::count(requests::request_id.nullable()),
            ))
            .load(conn)
            .map_err(Into::into)
    }

    /// Sums of the cost components of approved requests, per department.
    pub fn approved_costs_by_department(
        conn: &mut PgConnection,
    ) -> Result<Vec<(String, Option<Decimal>, Option<Decimal>, Option<Decimal>)>, RepositoryError>
    {
        use diesel::dsl::sum;

        requests::table
            .inner_join(faculty::table)
            .filter(requests::status.eq(RequestStatus::Approved.as_str()))
            .group_by(faculty::department)
            .select((
                faculty::department,
                sum(requests::per_diem),
                sum(requests::registration_fee),
                sum(requests::visa_fee),
            ))
            .load(conn)
            .map_err(Into::into)
    }

    pub fn count_by_status_between(
        conn: &mut PgConnection,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>, RepositoryError> {
        requests::table
            .filter(requests::created_at.ge(from))
            .filter(requests::created_at.lt(to))
            .group_by(requests::status)
            .select((requests::status, diesel::dsl::count_star()))
            .load(conn)
            .map_err(Into::into)
    }
}
