pub mod activity_repository;
pub mod budget_repository;
pub mod document_repository;
pub mod faculty_repository;
pub mod notification_repository;
pub mod travel_request_repository;
