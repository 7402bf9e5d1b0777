pub mod activity;
pub mod budget;
pub mod document;
pub mod faculty;
pub mod notification;
pub mod travel_request;
