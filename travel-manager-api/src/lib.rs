//! # travel-manager-api
//!
//! Shared API types for the travel-manager service.
//! This crate only depends on serde-friendly types so it can be used from
//! the backend and from a WASM frontend alike.
//!
//! ## Features
//!
//! - Request DTOs (LoginRequest, SubmitTravelRequest, SetBudgetRequest, etc.)
//! - Response DTOs (SessionResponse, TravelRequestResponse, ApprovalResponse, etc.)
//! - Dashboard, notification and document DTOs
//! - Error response format (ErrorResponse)
//! - Generic response wrapper (AppResponse)
//!
//! ## Example
//!
//! ```rust
//! use travel_manager_api::LoginRequest;
//!
//! let request = LoginRequest {
//!     user_id: "prof.smith".to_string(),
//!     password: "password123".to_string(),
//! };
//! ```

pub mod error;
pub mod requests;
pub mod responses;
pub mod result;

// Re-exports for convenient access
pub use error::ErrorResponse;
pub use requests::*;
pub use responses::*;
pub use result::{AppResponse, StatusCode};
