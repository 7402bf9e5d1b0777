// src/handlers/requests.rs

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use chrono::{Datelike, Utc};
use std::sync::Arc;
use travel_manager_api::{
    ApprovalResponse, DestinationCountResponse, FacultyFrequencyResponse, ListQuery,
    MonthlyCountResponse, RejectTravelRequest, RequestSearchResultResponse, SearchQuery,
    StatusCountResponse, SubmitTravelRequest, TopQuery, TravelRequestResponse, YearQuery,
};
use uuid::Uuid;

use super::run_blocking;
use crate::auth::roles::Capability;
use crate::auth::session::SessionContext;
use crate::db::models::travel_request::TravelRequest;
use crate::error::AppError;
use crate::response::AppResponse;
use crate::travel::analytics::{
    AnalyticsService, DEFAULT_TOP_DESTINATIONS, DEFAULT_TOP_FACULTY, top_limit,
};
use crate::travel::services::{TravelRequestService, clamp_limit};

fn to_response(request: TravelRequest) -> Result<TravelRequestResponse, AppError> {
    request.into_response().map_err(AppError::internal)
}

fn to_responses(requests: Vec<TravelRequest>) -> Result<Vec<TravelRequestResponse>, AppError> {
    requests.into_iter().map(to_response).collect()
}

/// POST /requests
pub async fn submit_request(
    session: SessionContext,
    State(service): State<Arc<TravelRequestService>>,
    payload: Result<Json<SubmitTravelRequest>, JsonRejection>,
) -> Result<AppResponse<TravelRequestResponse>, AppError> {
    session.require(Capability::SubmitRequest)?;
    let Json(payload) = payload?;

    let request = run_blocking(move || service.submit(&session.user_id, payload)).await?;
    Ok(AppResponse::created(to_response(request)?))
}

/// GET /requests/mine?status=&limit=
pub async fn my_requests(
    session: SessionContext,
    State(service): State<Arc<TravelRequestService>>,
    Query(query): Query<ListQuery>,
) -> Result<AppResponse<Vec<TravelRequestResponse>>, AppError> {
    session.require(Capability::ViewOwnRequests)?;
    let limit = clamp_limit(query.limit);

    let requests = run_blocking(move || {
        service.list_for_faculty(&session.user_id, query.status, limit)
    })
    .await?;
    Ok(AppResponse::ok(to_responses(requests)?))
}

/// GET /requests/pending?limit=
/// Les plus anciennes d'abord
pub async fn pending_requests(
    session: SessionContext,
    State(service): State<Arc<TravelRequestService>>,
    Query(query): Query<ListQuery>,
) -> Result<AppResponse<Vec<TravelRequestResponse>>, AppError> {
    session.require(Capability::ReviewRequests)?;
    let limit = clamp_limit(query.limit);

    let requests = run_blocking(move || service.list_pending(limit)).await?;
    Ok(AppResponse::ok(to_responses(requests)?))
}

/// GET /requests/stats?year=
pub async fn request_stats(
    session: SessionContext,
    State(service): State<Arc<TravelRequestService>>,
    Query(query): Query<YearQuery>,
) -> Result<AppResponse<Vec<StatusCountResponse>>, AppError> {
    session.require(Capability::ViewAllRequests)?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let counts = run_blocking(move || service.status_counts(year)).await?;
    Ok(AppResponse::ok(
        counts
            .into_iter()
            .map(|(status, count)| StatusCountResponse { status, count })
            .collect(),
    ))
}

/// GET /requests/stats/monthly?year=
pub async fn monthly_stats(
    session: SessionContext,
    State(analytics): State<Arc<AnalyticsService>>,
    Query(query): Query<YearQuery>,
) -> Result<AppResponse<Vec<MonthlyCountResponse>>, AppError> {
    session.require(Capability::ViewAllRequests)?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let counts = run_blocking(move || analytics.requests_by_month(year)).await?;
    Ok(AppResponse::ok(
        counts
            .into_iter()
            .map(|(month, count)| MonthlyCountResponse { month, count })
            .collect(),
    ))
}

/// GET /requests/stats/destinations?limit=
pub async fn destination_stats(
    session: SessionContext,
    State(analytics): State<Arc<AnalyticsService>>,
    Query(query): Query<TopQuery>,
) -> Result<AppResponse<Vec<DestinationCountResponse>>, AppError> {
    session.require(Capability::ViewAllRequests)?;
    let limit = top_limit(query.limit, DEFAULT_TOP_DESTINATIONS);

    let rows = run_blocking(move || analytics.top_destinations(limit)).await?;
    Ok(AppResponse::ok(
        rows.into_iter()
            .map(|(destination, count)| DestinationCountResponse { destination, count })
            .collect(),
    ))
}

/// GET /requests/stats/faculty?limit=
pub async fn faculty_stats(
    session: SessionContext,
    State(analytics): State<Arc<AnalyticsService>>,
    Query(query): Query<TopQuery>,
) -> Result<AppResponse<Vec<FacultyFrequencyResponse>>, AppError> {
    session.require(Capability::ViewAllRequests)?;
    let limit = top_limit(query.limit, DEFAULT_TOP_FACULTY);

    let rows = run_blocking(move || analytics.faculty_travel_frequency(limit)).await?;
    Ok(AppResponse::ok(
        rows.into_iter()
            .map(|(user_id, name, request_count)| FacultyFrequencyResponse {
                user_id,
                name,
                request_count,
            })
            .collect(),
    ))
}

/// GET /requests/search?q=&status=&limit=
pub async fn search_requests(
    session: SessionContext,
    State(service): State<Arc<TravelRequestService>>,
    Query(query): Query<SearchQuery>,
) -> Result<AppResponse<Vec<RequestSearchResultResponse>>, AppError> {
    session.require(Capability::ViewAllRequests)?;
    let limit = clamp_limit(query.limit);

    let hits = run_blocking(move || service.search(&query.q, query.status, limit)).await?;
    let results = hits
        .into_iter()
        .map(|(request, faculty_name, department)| {
            Ok(RequestSearchResultResponse {
                request: to_response(request)?,
                faculty_name,
                department,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(AppResponse::ok(results))
}

/// GET /requests/{id}
/// Visible par son auteur, ou par les rôles qui voient toutes les demandes.
/// Pour les autres, 404 comme pour un identifiant inconnu.
pub async fn get_request(
    session: SessionContext,
    State(service): State<Arc<TravelRequestService>>,
    Path(request_id): Path<Uuid>,
) -> Result<AppResponse<TravelRequestResponse>, AppError> {
    let request = run_blocking(move || service.get_for(request_id, &session)).await?;
    Ok(AppResponse::ok(to_response(request)?))
}

/// POST /requests/{id}/approve
/// Un refus faute de budget répond 409 avec `approved: false`
pub async fn approve_request(
    session: SessionContext,
    State(service): State<Arc<TravelRequestService>>,
    Path(request_id): Path<Uuid>,
) -> Result<AppResponse<ApprovalResponse>, AppError> {
    session.require(Capability::ReviewRequests)?;

    let outcome = run_blocking(move || service.approve(request_id, &session.user_id)).await?;
    let body = ApprovalResponse {
        request_id,
        approved: outcome.approved,
        message: outcome.message,
    };

    Ok(if body.approved {
        AppResponse::ok(body)
    } else {
        AppResponse::conflict(body)
    })
}

/// POST /requests/{id}/reject
/// Le corps `{"comments": ...}` est optionnel
pub async fn reject_request(
    session: SessionContext,
    State(service): State<Arc<TravelRequestService>>,
    Path(request_id): Path<Uuid>,
    payload: Result<Json<RejectTravelRequest>, JsonRejection>,
) -> Result<AppResponse<TravelRequestResponse>, AppError> {
    session.require(Capability::ReviewRequests)?;

    let comments = match payload {
        Ok(Json(body)) => body.comments,
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(e) => return Err(e.into()),
    };

    let request = run_blocking(move || {
        service.reject(request_id, &session.user_id, comments.as_deref())
    })
    .await?;
    Ok(AppResponse::ok(to_response(request)?))
}
