use crate::db::schema::uploadedfiles;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use travel_manager_api::DocumentResponse;
use uuid::Uuid;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = uploadedfiles)]
pub struct NewDocument<'a> {
    pub request_id: Uuid,
    pub file_type: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub file_size: i32,
    pub file_data: &'a [u8],
}

/// Stored document without its content.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = uploadedfiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentInfo {
    pub request_id: Uuid,
    pub file_type: String,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i32,
    pub upload_date: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = uploadedfiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Document {
    pub file_name: String,
    pub content_type: String,
    pub file_data: Vec<u8>,
}

impl DocumentInfo {
    pub fn into_response(self) -> Result<DocumentResponse, String> {
        Ok(DocumentResponse {
            request_id: self.request_id,
            file_type: self.file_type.parse()?,
            file_name: self.file_name,
            content_type: self.content_type,
            file_size: self.file_size,
            upload_date: self.upload_date,
        })
    }
}
