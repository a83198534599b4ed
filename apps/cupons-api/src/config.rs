//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use axum::http::HeaderValue;
use std::env;
use std::net::SocketAddr;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind
    pub http_host: String,

    /// HTTP port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// Origin allowed by CORS (e.g. `http://localhost:3001`). Unset: no CORS headers.
    pub cors_allow_origin: Option<HeaderValue>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_host: lookup("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            http_port: lookup("HTTP_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "./cupons.db".to_string()),

            jwt_secret: lookup("JWT_SECRET")
                // In production, this MUST be set via environment variable
                .unwrap_or_else(|| "cupons-dev-secret-change-in-production".to_string()),

            jwt_access_lifetime_secs: lookup("JWT_ACCESS_LIFETIME_SECS")
                .unwrap_or_else(|| "3600".to_string()) // 1 hour
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()))?,

            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN")
                .map(|origin| {
                    HeaderValue::from_str(&origin)
                        .map_err(|_| ConfigError::InvalidValue("CORS_ALLOW_ORIGIN".to_string()))
                })
                .transpose()?,
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }

        if config.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "JWT_ACCESS_LIFETIME_SECS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http_host, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HTTP_HOST".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
