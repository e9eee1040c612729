//! Refresh token entity - session-continuation credential.
//!
//! A refresh token is both a signed credential (held by the client) and
//! a server-side record (held by the repository). The record is what
//! makes revocation possible even though the credential is
//! self-contained.

use chrono::{DateTime, Utc};

use crate::domain::token::RefreshTokenId;
use crate::domain::user::UserId;

/// A persisted refresh-token record.
///
/// Exactly one lifecycle transition exists: active -> revoked, via
/// [`RefreshToken::revoke`]. Records are never deleted; revoked rows
/// double as an audit / anti-replay log.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    /// Raw signed token as handed to the client. Unique across records.
    pub token: String,
    pub user_id: UserId,
    /// Set exactly once, by `revoke()`. `None` means active.
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Create a new active record for a freshly issued token.
    pub fn issue(id: RefreshTokenId, token: String, user_id: UserId) -> Self {
        Self {
            id,
            token,
            user_id,
            revoked_at: None,
            created_at: Utc::now(),
        }
    }

    /// Rehydrate a record from storage.
    pub fn from_parts(
        id: RefreshTokenId,
        token: String,
        user_id: UserId,
        revoked_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            token,
            user_id,
            revoked_at,
            created_at,
        }
    }

    /// Whether this token has been revoked. Derived, never stored twice.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Revoke the token, stamping the current time.
    ///
    /// Revocation is monotonic: calling this on an already-revoked
    /// token keeps the original timestamp.
    pub fn revoke(&mut self) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(Utc::now());
        }
    }
}
