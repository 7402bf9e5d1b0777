// src/handlers/auth.rs

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use std::sync::Arc;
use travel_manager_api::{LoginRequest, MessageResponse, SessionInfoResponse, SessionResponse};

use super::run_blocking;
use crate::auth::extractors::client_ip;
use crate::auth::services::AuthService;
use crate::auth::session::SessionContext;
use crate::error::AppError;
use crate::response::AppResponse;

/// POST /auth/login
pub async fn login(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<AppResponse<SessionResponse>, AppError> {
    let Json(payload) = payload?;
    let ip_address = client_ip(&headers);

    let session = run_blocking(move || auth_service.login(&payload, ip_address)).await?;
    Ok(AppResponse::ok(session))
}

/// POST /auth/logout
pub async fn logout(
    session: SessionContext,
    State(auth_service): State<Arc<AuthService>>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    run_blocking(move || {
        auth_service.logout(&session);
        Ok(())
    })
    .await?;

    Ok(AppResponse::ok(MessageResponse::new("Logged out successfully")))
}

/// GET /auth/me
pub async fn me(session: SessionContext) -> AppResponse<SessionInfoResponse> {
    AppResponse::ok(session.into())
}
