//! Token value objects.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// A signed, short-lived, stateless access token.
///
/// Carries no server-side state: it is never persisted and cannot be
/// revoked before its natural expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a signed compact token.
    ///
    /// # Errors
    /// Returns an internal error for an empty token (the signer never
    /// produces one; an empty value indicates a bug upstream).
    pub fn new(token: String) -> AppResult<Self> {
        if token.is_empty() {
            return Err(AppError::internal("Access token must not be empty"));
        }
        Ok(Self(token))
    }

    /// Get the compact token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the compact token string.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unique identifier of a persisted refresh-token record.
///
/// Doubles as the `jti` claim of the signed refresh token, tying the
/// signed credential to its server-side record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RefreshTokenId(Uuid);

impl RefreshTokenId {
    /// Generate a new, time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Rehydrate from a stored UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RefreshTokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
