// src/handlers/documents.rs

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use std::sync::Arc;
use travel_manager_api::{DocumentKind, DocumentResponse, DocumentUploadQuery};
use uuid::Uuid;

use super::run_blocking;
use crate::auth::session::SessionContext;
use crate::db::models::document::DocumentInfo;
use crate::error::AppError;
use crate::response::AppResponse;
use crate::travel::documents::{DocumentService, validate_document};

fn document_path(
    path: Result<Path<(Uuid, DocumentKind)>, PathRejection>,
) -> Result<(Uuid, DocumentKind), AppError> {
    path.map(|Path(parts)| parts)
        .map_err(|e| AppError::invalid_input(format!("Invalid document path: {e}")))
}

fn to_response(info: DocumentInfo) -> Result<DocumentResponse, AppError> {
    info.into_response().map_err(AppError::internal)
}

/// `attachment; filename="..."` sans guillemets ni caractères de contrôle
pub fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_control() || c == '"' || c == '\\' { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

/// POST /requests/{id}/documents/{file_type}?file_name=
/// Le corps est le fichier brut, typé par `Content-Type`
pub async fn upload_document(
    session: SessionContext,
    State(service): State<Arc<DocumentService>>,
    path: Result<Path<(Uuid, DocumentKind)>, PathRejection>,
    query: Result<Query<DocumentUploadQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<AppResponse<DocumentResponse>, AppError> {
    let (request_id, kind) = document_path(path)?;
    let Query(query) =
        query.map_err(|e| AppError::invalid_input(format!("Invalid upload query: {e}")))?;
    let body = body.map_err(|e| AppError::validation(format!("Unreadable upload: {e}")))?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let upload = validate_document(&query.file_name, content_type, body.len())?;

    let info = run_blocking(move || service.upload(request_id, kind, &session, &upload, &body)).await?;
    Ok(AppResponse::created(to_response(info)?))
}

/// GET /requests/{id}/documents
pub async fn list_documents(
    session: SessionContext,
    State(service): State<Arc<DocumentService>>,
    Path(request_id): Path<Uuid>,
) -> Result<AppResponse<Vec<DocumentResponse>>, AppError> {
    let documents = run_blocking(move || service.list(request_id, &session)).await?;
    Ok(AppResponse::ok(
        documents
            .into_iter()
            .map(to_response)
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

/// GET /requests/{id}/documents/{file_type}
/// Renvoie le fichier tel qu'il a été déposé
pub async fn download_document(
    session: SessionContext,
    State(service): State<Arc<DocumentService>>,
    path: Result<Path<(Uuid, DocumentKind)>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let (request_id, kind) = document_path(path)?;

    let document = run_blocking(move || service.download(request_id, kind, &session)).await?;
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&document.file_name),
            ),
        ],
        document.file_data,
    ))
}
