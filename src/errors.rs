//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion. Every error carries a
//! stable machine-readable code; internal causes are logged and never
//! leaked to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid email or password")]
    InvalidEmailOrPassword,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token has been revoked")]
    RefreshTokenRevoked,

    // Business rules
    #[error("A user with this email already exists")]
    UserAlreadyExists,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // Validation
    #[error("{0}")]
    Validation(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidEmailOrPassword => "INVALID_EMAIL_OR_PASSWORD",
            AppError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AppError::RefreshTokenRevoked => "REFRESH_TOKEN_REVOKED",
            AppError::UserAlreadyExists => "APP_USER_EXISTS",
            AppError::NotFound => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized
            | AppError::InvalidEmailOrPassword
            | AppError::InvalidRefreshToken
            | AppError::RefreshTokenRevoked => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::UserAlreadyExists => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),

            // Hide details for internal/infrastructure errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_have_stable_codes() {
        assert_eq!(AppError::UserAlreadyExists.code(), "APP_USER_EXISTS");
        assert_eq!(
            AppError::InvalidEmailOrPassword.code(),
            "INVALID_EMAIL_OR_PASSWORD"
        );
        assert_eq!(AppError::InvalidRefreshToken.code(), "INVALID_REFRESH_TOKEN");
        assert_eq!(AppError::RefreshTokenRevoked.code(), "REFRESH_TOKEN_REVOKED");
    }

    #[test]
    fn test_internal_message_is_not_leaked() {
        let err = AppError::internal("secret connection string");
        assert!(!err.user_message().contains("secret"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::UserAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::RefreshTokenRevoked.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::validation("bad").status(),
            StatusCode::BAD_REQUEST
        );
    }
}
