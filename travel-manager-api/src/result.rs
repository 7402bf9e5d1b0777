use serde::{Deserialize, Serialize};

/// HTTP status codes the API answers with.
/// Kept free of any HTTP crate so the type compiles to WASM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    Conflict = 409,
    TooManyRequests = 429,
    InternalServerError = 500,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.as_u16())
    }
}

/// Generic API response wrapper
///
/// The backend wraps this in a type that implements Axum's IntoResponse trait.
///
/// # Examples
///
/// ```rust
/// use travel_manager_api::{AppResponse, StatusCode};
///
/// let response = AppResponse::ok("data");
/// assert_eq!(response.status, StatusCode::Ok);
///
/// let refused = AppResponse::conflict("Insufficient budget");
/// assert!(!refused.status.is_success());
///
/// let response: AppResponse<()> = AppResponse::no_content();
/// assert!(response.data.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub status: StatusCode,
}

impl<T> AppResponse<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status,
            data: Some(data),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self { status, data: None }
    }

    /// 200 OK with data
    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::Ok, data)
    }

    /// 201 Created with data
    pub fn created(data: T) -> Self {
        Self::new(StatusCode::Created, data)
    }

    /// 409 Conflict carrying a regular body (e.g. a refused approval)
    pub fn conflict(data: T) -> Self {
        Self::new(StatusCode::Conflict, data)
    }
}

impl AppResponse<()> {
    /// 204 No Content
    pub fn no_content() -> Self {
        Self::empty(StatusCode::NoContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct TestData {
        message: String,
    }

    #[test]
    fn ok_response_carries_data() {
        let data = TestData {
            message: "success".to_string(),
        };
        let response = AppResponse::ok(data.clone());
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.data, Some(data));
    }

    #[test]
    fn conflict_response_is_not_success() {
        let response = AppResponse::conflict("Insufficient budget");
        assert_eq!(response.status, StatusCode::Conflict);
        assert!(!response.status.is_success());
        assert_eq!(response.status.as_u16(), 409);
    }

    #[test]
    fn no_content_response_has_no_data() {
        let response = AppResponse::no_content();
        assert_eq!(response.status, StatusCode::NoContent);
        assert!(response.data.is_none());
    }

    #[test]
    fn serialization_includes_status_and_data() {
        let response = AppResponse::created(TestData {
            message: "test".to_string(),
        });
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"Created\""));
        assert!(json.contains("\"message\":\"test\""));
    }
}
