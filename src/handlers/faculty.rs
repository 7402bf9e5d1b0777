use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;
use travel_manager_api::{CreateFacultyRequest, FacultyResponse};

use super::run_blocking;
use crate::auth::roles::Capability;
use crate::auth::services::AuthService;
use crate::auth::session::SessionContext;
use crate::error::AppError;
use crate::response::AppResponse;

/// POST /faculty
/// Création d'un compte (admin uniquement)
pub async fn create_faculty(
    session: SessionContext,
    State(auth_service): State<Arc<AuthService>>,
    payload: Result<Json<CreateFacultyRequest>, JsonRejection>,
) -> Result<AppResponse<FacultyResponse>, AppError> {
    session.require(Capability::ManageFaculty)?;
    let Json(payload) = payload?;

    let faculty = run_blocking(move || auth_service.create_faculty(payload)).await?;
    Ok(AppResponse::created(faculty))
}
