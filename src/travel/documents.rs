// src/travel/documents.rs

use travel_manager_api::{DocumentKind, RequestStatus};
use uuid::Uuid;

use crate::auth::session::SessionContext;
use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::models::document::{Document, DocumentInfo, NewDocument};
use crate::db::repositories::document_repository::DocumentRepository;
use crate::db::repositories::travel_request_repository::TravelRequestRepository;
use crate::error::AppError;
use crate::travel::services::ensure_visible;

pub const MAX_DOCUMENT_MB: usize = 10;
pub const MAX_DOCUMENT_BYTES: usize = MAX_DOCUMENT_MB * 1024 * 1024;
const MAX_FILE_NAME_LEN: usize = 255;

/// Accepted content types and the file extension each one requires.
pub const ALLOWED_DOCUMENT_TYPES: [(&str, &str); 2] = [
    ("application/pdf", "pdf"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
];

/// A validated upload: file name stripped of any path, canonical content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedUpload {
    pub file_name: String,
    pub content_type: &'static str,
    pub size: i32,
}

/// Checks size, content type and extension before anything is stored.
pub fn validate_document(
    file_name: &str,
    content_type: &str,
    size: usize,
) -> Result<CheckedUpload, AppError> {
    if size == 0 {
        return Err(AppError::validation("No file uploaded"));
    }
    if size > MAX_DOCUMENT_BYTES {
        return Err(AppError::validation(format!(
            "File is too large. Maximum size allowed: {MAX_DOCUMENT_MB}MB"
        )));
    }

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let Some(&(content_type, extension)) = ALLOWED_DOCUMENT_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == essence)
    else {
        let allowed: Vec<&str> = ALLOWED_DOCUMENT_TYPES.iter().map(|(t, _)| *t).collect();
        return Err(AppError::validation(format!(
            "Invalid file type. Allowed types: {}",
            allowed.join(", ")
        )));
    };

    let file_name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    if file_name.is_empty() || file_name.len() > MAX_FILE_NAME_LEN {
        return Err(AppError::validation(format!(
            "file_name must be 1 to {MAX_FILE_NAME_LEN} characters"
        )));
    }
    if file_name.chars().any(|c| c.is_control() || c == '"') {
        return Err(AppError::validation("file_name contains invalid characters"));
    }
    let matches_extension = file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension));
    if !matches_extension {
        return Err(AppError::validation(format!(
            "Only .{extension} files are allowed for {content_type}"
        )));
    }

    let size = i32::try_from(size).map_err(|_| AppError::validation("File is too large"))?;
    Ok(CheckedUpload {
        file_name,
        content_type,
        size,
    })
}

/// Research paper and acceptance letter attached to a request.
pub struct DocumentService {
    pool: DbPool,
}

impl DocumentService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Seul l'auteur dépose, et seulement tant que la demande est en attente.
    /// Un nouveau dépôt remplace le document du même type.
    pub fn upload(
        &self,
        request_id: Uuid,
        kind: DocumentKind,
        uploader: &SessionContext,
        upload: &CheckedUpload,
        content: &[u8],
    ) -> Result<DocumentInfo, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let request = TravelRequestRepository::find_by_id(&mut conn, request_id)?
            .ok_or_else(|| AppError::not_found(format!("Travel request {request_id}")))?;
        let request = ensure_visible(request, uploader)?;

        if request.faculty_user_id != uploader.user_id {
            return Err(AppError::forbidden(
                "Only the submitter can attach documents to a request",
            ));
        }
        if request.status != RequestStatus::Pending.as_str() {
            return Err(AppError::invalid_transition(format!(
                "Request {request_id} is {}, documents can only change while pending",
                request.status
            )));
        }

        let info = DocumentRepository::save(
            &mut conn,
            &NewDocument {
                request_id,
                file_type: kind.as_str(),
                file_name: &upload.file_name,
                content_type: upload.content_type,
                file_size: upload.size,
                file_data: content,
            },
        )?;

        tracing::info!(
            %request_id,
            file_type = %kind,
            file_name = %info.file_name,
            size = info.file_size,
            "Document stored"
        );
        Ok(info)
    }

    pub fn list(&self, request_id: Uuid, viewer: &SessionContext) -> Result<Vec<DocumentInfo>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let request = TravelRequestRepository::find_by_id(&mut conn, request_id)?
            .ok_or_else(|| AppError::not_found(format!("Travel request {request_id}")))?;
        ensure_visible(request, viewer)?;

        Ok(DocumentRepository::list_for_request(&mut conn, request_id)?)
    }

    pub fn download(
        &self,
        request_id: Uuid,
        kind: DocumentKind,
        viewer: &SessionContext,
    ) -> Result<Document, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let request = TravelRequestRepository::find_by_id(&mut conn, request_id)?
            .ok_or_else(|| AppError::not_found(format!("Travel request {request_id}")))?;
        ensure_visible(request, viewer)?;

        DocumentRepository::find(&mut conn, request_id, kind.as_str())?
            .ok_or_else(|| AppError::not_found(format!("No {kind} for request {request_id}")))
    }
}
