use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a faculty account.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Professor,
    Accountant,
    Approval,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Professor => "professor",
            Self::Accountant => "accountant",
            Self::Approval => "approval",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professor" => Ok(Self::Professor),
            "accountant" => Ok(Self::Accountant),
            "approval" => Ok(Self::Approval),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Lifecycle state of a travel request: `pending -> {approved, rejected}`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown request status '{other}'")),
        }
    }
}

/// Severity attached to an in-app notification.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown notification type '{other}'")),
        }
    }
}

/// Supporting document attached to a travel request, one of each per request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ResearchPaper,
    AcceptanceLetter,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResearchPaper => "research_paper",
            Self::AcceptanceLetter => "acceptance_letter",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "research_paper" => Ok(Self::ResearchPaper),
            "acceptance_letter" => Ok(Self::AcceptanceLetter),
            other => Err(format!("unknown document type '{other}'")),
        }
    }
}

// -------- REQUEST DTOs --------
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String, // Plain text
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateFacultyRequest {
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub role: Role,
    pub password: String, // Plain text
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmitTravelRequest {
    pub conference_name: String,
    pub purpose_of_attending: String,
    #[serde(default)]
    pub conference_url: Option<String>,
    pub destination: String,
    pub city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub per_diem: Decimal,
    pub registration_fee: Decimal,
    pub visa_fee: Decimal,
    #[serde(default)]
    pub index_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SetBudgetRequest {
    pub amount: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RejectTravelRequest {
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct YearQuery {
    #[serde(default)]
    pub year: Option<i32>,
}

/// `GET /requests/search?q=&status=&limit=`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Ranking endpoints only take a limit.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TopQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NotificationQuery {
    #[serde(default)]
    pub include_read: bool,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Query string of a document upload; the bytes are the raw request body.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DocumentUploadQuery {
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_string_form() {
        for role in [Role::Professor, Role::Accountant, Role::Approval, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("dean".parse::<Role>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&RequestStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }

    #[test]
    fn document_kind_uses_snake_case() {
        let kind: DocumentKind = serde_json::from_str("\"acceptance_letter\"").unwrap();
        assert_eq!(kind, DocumentKind::AcceptanceLetter);
        assert_eq!("research_paper".parse(), Ok(DocumentKind::ResearchPaper));
        assert!("passport".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn notification_query_defaults_to_unread() {
        let query: NotificationQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.include_read);
        assert!(query.limit.is_none());
    }

    #[test]
    fn submit_request_accepts_numeric_amounts() {
        let json = r#"{
            "conference_name": "RustConf",
            "purpose_of_attending": "Presenting at a Conference",
            "destination": "USA",
            "city": "Chicago",
            "date_from": "2026-09-01",
            "date_to": "2026-09-04",
            "per_diem": 300,
            "registration_fee": "450.50",
            "visa_fee": 0
        }"#;
        let req: SubmitTravelRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.per_diem, Decimal::from(300));
        assert_eq!(req.registration_fee, Decimal::new(45050, 2));
        assert!(req.conference_url.is_none());
        assert!(req.index_type.is_none());
    }
}
