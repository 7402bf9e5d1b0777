mod app;
mod auth;
mod budget;
mod config;
mod db;
mod error;
mod handlers;
mod notifications;
mod response;
mod travel;

use app::{AppState, build_router};
use auth::jwt::JwtManager;
use auth::rate_limit::RateLimiter;
use auth::session::SessionStore;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Si RUST_LOG n'est pas défini, utiliser ces règles par défaut
        tracing_subscriber::EnvFilter::new(
            "info,travel_manager=debug,hyper_util=warn,tower_http=info",
        )
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    setup_logging();
    tracing::info!("Starting travel-manager...");

    let config = Config::from_env()?;

    let pool = db::connection::create_pool(&config.database_url, config.db_pool_size)
        .inspect_err(|e| tracing::error!(error = %e, "Database unavailable at startup"))?;

    let state = AppState::new(
        pool,
        JwtManager::new(&config.jwt_secret),
        RateLimiter::new(config.max_login_attempts, config.login_window_seconds),
        SessionStore::new(config.session_timeout_minutes),
    );
    let app = build_router(state);

    if config.is_production() && std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        tracing::info!("Running in Lambda mode");
        lambda_http::run(app).await
    } else {
        tracing::info!("Running in local HTTP server mode");
        let addr = config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
