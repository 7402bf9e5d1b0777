use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::requests::{DocumentKind, NotificationType, RequestStatus, Role};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FacultyResponse {
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Returned by a successful login
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub user: FacultyResponse,
}

/// Current session as seen by the server
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionInfoResponse {
    pub session_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TravelRequestResponse {
    pub request_id: Uuid,
    pub faculty_user_id: String,
    pub conference_name: String,
    pub purpose_of_attending: String,
    pub conference_url: Option<String>,
    pub destination: String,
    pub city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub per_diem: Decimal,
    pub registration_fee: Decimal,
    pub visa_fee: Decimal,
    pub total_cost: Decimal,
    pub index_type: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub reviewer_id: Option<String>,
    pub review_comments: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Outcome of an approval. An approval refused for lack of funds is
/// reported here with `approved: false`, not as an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApprovalResponse {
    pub request_id: Uuid,
    pub approved: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BudgetResponse {
    pub funds_available: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BudgetHistoryEntryResponse {
    pub id: i64,
    pub adjustment_type: String,
    pub amount: Decimal,
    pub description: String,
    pub update_timestamp: DateTime<Utc>,
}

/// Both views of the remaining budget, side by side.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BudgetSummaryResponse {
    pub year: i32,
    pub funds_available: Decimal,
    pub total_budget: Decimal,
    pub total_expenses: Decimal,
    pub remaining: Decimal,
    pub diverged: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusCountResponse {
    pub status: RequestStatus,
    pub count: i64,
}

/// Search hit: the request plus who submitted it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RequestSearchResultResponse {
    #[serde(flatten)]
    pub request: TravelRequestResponse,
    pub faculty_name: String,
    pub department: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MonthlyCountResponse {
    pub month: u32,
    pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DestinationCountResponse {
    pub destination: String,
    pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FacultyFrequencyResponse {
    pub user_id: String,
    pub name: String,
    pub request_count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DepartmentSpendingResponse {
    pub department: String,
    pub total_expense: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationResponse {
    pub id: i64,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Metadata of a stored document; the content is served separately.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DocumentResponse {
    pub request_id: Uuid,
    pub file_type: DocumentKind,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i32,
    pub upload_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
