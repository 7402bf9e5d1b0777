use anyhow::Result;
use std::env;
use std::str::FromStr;

use crate::auth::rate_limit::{DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_SECONDS};
use crate::auth::session::DEFAULT_SESSION_TIMEOUT_MINUTES;

const DEFAULT_POOL_SIZE: u32 = 5;
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Détecte automatiquement l'environnement
    pub fn detect() -> Self {
        // AWS Lambda => production
        if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
            return Self::Production;
        }

        match env::var("APP_ENV").as_deref() {
            Ok("production" | "prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database_url: String,
    pub db_pool_size: u32,
    pub jwt_secret: String,
    pub session_timeout_minutes: i64,
    pub max_login_attempts: u32,
    pub login_window_seconds: i64,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Result<Self> {
        let environment = Environment::detect();
        tracing::info!(
            "🌍 Environment detected: {}",
            environment.as_str().to_uppercase()
        );

        let database_url = Self::get_database_url(&environment)?;
        let jwt_secret = Self::get_jwt_secret(&environment)?;
        let db_pool_size = parse_or("DB_POOL_SIZE", DEFAULT_POOL_SIZE).max(1);
        let session_timeout_minutes =
            parse_or("SESSION_TIMEOUT_MINUTES", DEFAULT_SESSION_TIMEOUT_MINUTES).max(1);
        let max_login_attempts = parse_or("MAX_LOGIN_ATTEMPTS", DEFAULT_MAX_ATTEMPTS).max(1);
        let login_window_seconds = parse_or("LOGIN_WINDOW_SECONDS", DEFAULT_WINDOW_SECONDS).max(1);
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = parse_or("SERVER_PORT", 3000);

        tracing::info!("✅ Configuration loaded successfully");
        tracing::debug!("   Database: {}", Self::mask_credentials(&database_url));
        tracing::debug!("   Pool size: {}", db_pool_size);
        tracing::debug!(
            "   Sessions: {} min, login limit: {} attempts / {} s",
            session_timeout_minutes,
            max_login_attempts,
            login_window_seconds
        );
        tracing::debug!("   Server: {}:{}", server_host, server_port);

        Ok(Self {
            environment,
            database_url,
            db_pool_size,
            jwt_secret,
            session_timeout_minutes,
            max_login_attempts,
            login_window_seconds,
            server_host,
            server_port,
        })
    }

    /// DATABASE_URL, ou construite depuis les composants en développement
    fn get_database_url(environment: &Environment) -> Result<String> {
        if let Ok(url) = env::var("DATABASE_URL") {
            return Ok(url);
        }

        if environment.is_production() {
            anyhow::bail!(
                "DATABASE_URL must be set in production! \
                 Configure it in Lambda environment variables."
            );
        }

        let user = env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string());
        let password = env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "postgres".to_string());
        let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let database = env::var("POSTGRES_DB").unwrap_or_else(|_| "travel_db".to_string());

        Ok(format!("postgres://{user}:{password}@{host}:{port}/{database}"))
    }

    /// JWT_SECRET, obligatoire et long en production
    fn get_jwt_secret(environment: &Environment) -> Result<String> {
        let secret = match env::var("JWT_SECRET") {
            Ok(s) => s,
            Err(_) if environment.is_production() => {
                tracing::error!("❌ JWT_SECRET not set in production!");
                anyhow::bail!("JWT_SECRET is required in production");
            }
            Err(_) => {
                tracing::warn!("⚠️  JWT_SECRET not set, using default (DEVELOPMENT ONLY!)");
                "dev_secret_key_change_in_production".to_string()
            }
        };

        Self::validate_secret(environment, &secret)?;
        Ok(secret)
    }

    fn validate_secret(environment: &Environment, secret: &str) -> Result<()> {
        if environment.is_production() && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            anyhow::bail!(
                "JWT_SECRET must be at least {MIN_PRODUCTION_SECRET_LEN} characters in production (current: {})",
                secret.len()
            );
        }
        Ok(())
    }

    /// Masque les credentials dans les logs
    fn mask_credentials(url: &str) -> String {
        if let Some(at_pos) = url.find('@')
            && let Some(scheme_end) = url.find("://")
        {
            let scheme = &url[..scheme_end + 3];
            let after_at = &url[at_pos..];
            return format!("{scheme}***:***{after_at}");
        }
        url.to_string()
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Valeur numérique d'une variable, ou `default` si absente ou invalide
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
