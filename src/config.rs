use std::env;
use std::str::FromStr;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::auth::PolicyEngine;
use crate::entities::user::Role;
use crate::middleware::rate_limiter::RateLimiter;
use crate::utils::jwt_utils::JwtUtils;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} has an invalid value: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub run_migrations: bool,
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub jwt_refresh_days: i64,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
    pub default_user_role: Role,
    pub cors_allowed_origins: Vec<String>,
    pub seed_admin: Option<SeedAdmin>,
}

/// Credentials for the bootstrap administrator account.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub jwt: JwtUtils,
    pub policy: PolicyEngine,
    pub rate_limiter: Arc<RateLimiter>,
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        let server_host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = parsed("PORT", 3000u16)?;

        let database_url = required("DATABASE_URL")?;
        let run_migrations = parsed("RUN_MIGRATIONS", true)?;

        let jwt_secret = required("JWT_SECRET")?;
        let jwt_expiration_minutes = parsed("JWT_EXPIRATION_MINUTES", 60i64)?;
        let jwt_refresh_days = parsed("JWT_REFRESH_DAYS", 7i64)?;

        let rate_limit_max_requests = parsed("RATE_LIMIT_MAX_REQUESTS", 100usize)?;
        let rate_limit_window_secs = parsed("RATE_LIMIT_WINDOW_SECS", 60u64)?;

        let default_user_role = match env::var("DEFAULT_USER_ROLE") {
            Ok(raw) => raw
                .parse::<Role>()
                .map_err(|e| ConfigError::Invalid("DEFAULT_USER_ROLE", e))?,
            Err(_) => Role::Editor,
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let seed_admin = match (
            env::var("SEED_ADMIN_USERNAME"),
            env::var("SEED_ADMIN_EMAIL"),
            env::var("SEED_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => Some(SeedAdmin {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Ok(Config {
            server_host,
            server_port,
            database_url,
            run_migrations,
            jwt_secret,
            jwt_expiration_minutes,
            jwt_refresh_days,
            rate_limit_max_requests,
            rate_limit_window_secs,
            default_user_role,
            cors_allowed_origins,
            seed_admin,
        })
    }
}
