// src/handlers/notifications.rs

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use std::sync::Arc;
use travel_manager_api::{MessageResponse, NotificationQuery, NotificationResponse};

use super::run_blocking;
use crate::auth::session::SessionContext;
use crate::error::AppError;
use crate::notifications::services::{DEFAULT_NOTIFICATION_LIMIT, NotificationService};
use crate::response::AppResponse;
use crate::travel::services::clamp_limit;

fn notification_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::invalid_input(format!("Invalid notification id: {e}")))
}

/// GET /notifications?include_read=&limit=
/// Non lues seulement par défaut, les plus récentes d'abord
pub async fn list_notifications(
    session: SessionContext,
    State(service): State<Arc<NotificationService>>,
    Query(query): Query<NotificationQuery>,
) -> Result<AppResponse<Vec<NotificationResponse>>, AppError> {
    let limit = clamp_limit(Some(query.limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT)));

    let notifications =
        run_blocking(move || service.list(&session.user_id, query.include_read, limit)).await?;
    let body = notifications
        .into_iter()
        .map(|n| n.into_response().map_err(AppError::internal))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AppResponse::ok(body))
}

/// POST /notifications/{id}/read
pub async fn mark_notification_read(
    session: SessionContext,
    State(service): State<Arc<NotificationService>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<AppResponse<()>, AppError> {
    let id = notification_id(path)?;
    run_blocking(move || service.mark_read(&session.user_id, id)).await?;
    Ok(AppResponse::no_content())
}

/// POST /notifications/read
pub async fn mark_all_notifications_read(
    session: SessionContext,
    State(service): State<Arc<NotificationService>>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    let updated = run_blocking(move || service.mark_all_read(&session.user_id)).await?;
    Ok(AppResponse::ok(MessageResponse::new(format!(
        "{updated} notification(s) marked as read"
    ))))
}

/// DELETE /notifications/{id}
pub async fn delete_notification(
    session: SessionContext,
    State(service): State<Arc<NotificationService>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<AppResponse<()>, AppError> {
    let id = notification_id(path)?;
    run_blocking(move || service.delete(&session.user_id, id)).await?;
    Ok(AppResponse::no_content())
}
