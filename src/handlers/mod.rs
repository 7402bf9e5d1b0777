pub mod auth;
pub mod budget;
pub mod documents;
pub mod faculty;
pub mod health;
pub mod notifications;
pub mod requests;

use crate::error::AppError;

/// Diesel et bcrypt sont synchrones: le travail part sur le pool bloquant de tokio
pub async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
