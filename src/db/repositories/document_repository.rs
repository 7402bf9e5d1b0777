use crate::db::error::RepositoryError;
use crate::db::models::document::{Document, DocumentInfo, NewDocument};
use crate::db::schema::uploadedfiles;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub struct DocumentRepository;

impl DocumentRepository {
    /// Insert, or replace the document of the same kind for this request
    pub fn save(conn: &mut PgConnection, document: &NewDocument) -> Result<DocumentInfo, RepositoryError> {
        diesel::insert_into(uploadedfiles::table)
            .values(document)
            .on_conflict((uploadedfiles::request_id, uploadedfiles::file_type))
            .do_update()
            .set((
                uploadedfiles::file_name.eq(document.file_name),
                uploadedfiles::content_type.eq(document.content_type),
                uploadedfiles::file_size.eq(document.file_size),
                uploadedfiles::file_data.eq(document.file_data),
                uploadedfiles::upload_date.eq(Utc::now()),
            ))
            .returning(DocumentInfo::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn find(
        conn: &mut PgConnection,
        request_id: Uuid,
        file_type: &str,
    ) -> Result<Option<Document>, RepositoryError> {
        uploadedfiles::table
            .filter(uploadedfiles::request_id.eq(request_id))
            .filter(uploadedfiles::file_type.eq(file_type))
            .select(Document::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn list_for_request(
        conn: &mut PgConnection,
        request_id: Uuid,
    ) -> Result<Vec<DocumentInfo>, RepositoryError> {
        uploadedfiles::table
            .filter(uploadedfiles::request_id.eq(request_id))
            .order_by(uploadedfiles::file_type.asc())
            .select(DocumentInfo::as_select())
            .load(conn)
            .map_err(Into::into)
    }
}
