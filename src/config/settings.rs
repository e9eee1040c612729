//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_ACCESS_TOKEN_TTL_MINUTES, DEFAULT_DATABASE_URL, DEFAULT_REFRESH_TOKEN_TTL_DAYS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    access_token_secret: String,
    refresh_token_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .field("refresh_token_secret", &"[REDACTED]")
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if a token secret is missing in release builds or is too
    /// short (security requirement). Access and refresh tokens must be
    /// signed with distinct secrets so one class of token can never be
    /// verified as the other.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let access_token_secret = load_secret("JWT_ACCESS_SECRET", "dev-access-secret-minimum-32-chars!!");
        let refresh_token_secret =
            load_secret("JWT_REFRESH_SECRET", "dev-refresh-secret-minimum-32-chars!");

        if access_token_secret == refresh_token_secret {
            panic!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ");
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            access_token_secret,
            refresh_token_secret,
            access_token_ttl_minutes: env::var("ACCESS_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
            refresh_token_ttl_days: env::var("REFRESH_TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
        }
    }

    /// Build a configuration from explicit values (used by tests).
    pub fn with_secrets(
        access_token_secret: impl Into<String>,
        refresh_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            access_token_secret: access_token_secret.into(),
            refresh_token_secret: refresh_token_secret.into(),
            access_token_ttl_minutes: DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
            refresh_token_ttl_days: DEFAULT_REFRESH_TOKEN_TTL_DAYS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    /// Access-token signing secret bytes.
    pub fn access_secret_bytes(&self) -> &[u8] {
        self.access_token_secret.as_bytes()
    }

    /// Refresh-token signing secret bytes.
    pub fn refresh_secret_bytes(&self) -> &[u8] {
        self.refresh_token_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Resolve a secret from the environment, falling back to an insecure
/// development default in debug builds only.
fn load_secret(var: &str, dev_default: &str) -> String {
    let secret = env::var(var).unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            tracing::warn!("{} not set, using insecure default for development", var);
            dev_default.to_string()
        } else {
            panic!("{} environment variable must be set in production", var);
        }
    });

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        panic!(
            "{} must be at least {} characters long",
            var, MIN_JWT_SECRET_LENGTH
        );
    }

    secret
}
