//! Application configuration loaded from environment variables.

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_COOKIE_NAME: &str = "auth_token";
const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
const DEFAULT_FRONTEND_DIR: &str = "frontend/dist";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Configuration for the server and its upstream collaborators.
///
/// The production/non-production distinction is resolved once at startup into
/// `expose_error_details`; the error path never consults the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the server listens on.
    pub port: u16,
    /// Whether 500 responses carry the raw upstream diagnostic payload.
    /// False when `APP_ENV=production`.
    pub expose_error_details: bool,
    /// HMAC key the identity provider signs session tokens with.
    pub jwt_secret: String,
    /// Cookie the session token may arrive in, as an alternative to the
    /// `Authorization` header.
    pub cookie_name: String,
    /// Identity provider API base URL.
    pub identity_api_url: String,
    /// Identity provider API credential.
    pub identity_secret_key: String,
    /// Calendar provider API base URL.
    pub calendar_api_url: String,
    /// Comma-separated CORS origin allow-list; permissive when unset.
    pub cors_allowed_origins: Option<String>,
    /// Directory of built frontend assets to serve, if it exists.
    pub frontend_dir: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Required: `JWT_SECRET`, `IDENTITY_API_URL`, `IDENTITY_SECRET_KEY`.
    /// Optional: `PORT`, `APP_ENV`, `AUTH_COOKIE_NAME`, `CALENDAR_API_URL`,
    /// `CORS_ALLOWED_ORIGINS`, `FRONTEND_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let app_env = std::env::var("APP_ENV").unwrap_or_default();

        Ok(Self {
            port,
            expose_error_details: app_env != "production",
            jwt_secret: require("JWT_SECRET")?,
            cookie_name: std::env::var("AUTH_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_COOKIE_NAME.to_string()),
            identity_api_url: require("IDENTITY_API_URL")?,
            identity_secret_key: require("IDENTITY_SECRET_KEY")?,
            calendar_api_url: std::env::var("CALENDAR_API_URL")
                .unwrap_or_else(|_| DEFAULT_CALENDAR_API_URL.to_string()),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS").ok(),
            frontend_dir: std::env::var("FRONTEND_DIR")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_DIR.to_string()),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}
