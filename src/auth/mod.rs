pub mod extractors;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod roles;
pub mod session;
pub mod services;
