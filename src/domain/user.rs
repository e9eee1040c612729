//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_MENTEE, ROLE_MENTOR};
use crate::domain::{Email, HashedPassword};
use crate::errors::{AppError, AppResult};

/// Unique user identifier.
///
/// DDD: Value object wrapping a time-ordered UUID. Two construction
/// paths: `generate()` for new identities, `parse()`/`from_uuid()` for
/// rehydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new, time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Rehydrate from a stored UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse from a string representation.
    ///
    /// # Errors
    /// Returns a validation error for anything that is not a UUID.
    pub fn parse(raw: &str) -> AppResult<Self> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AppError::validation("Invalid user id format"))
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User roles in the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Mentee,
    Mentor,
    Admin,
}

impl UserRole {
    /// Parse a role from its wire/database representation.
    ///
    /// Matching is case-insensitive so that "mentee" stored in the
    /// database and "MENTEE" sent by a client both resolve.
    ///
    /// # Errors
    /// Returns a validation error for unknown role names.
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw.to_ascii_uppercase().as_str() {
            ROLE_MENTEE => Ok(UserRole::Mentee),
            ROLE_MENTOR => Ok(UserRole::Mentor),
            ROLE_ADMIN => Ok(UserRole::Admin),
            _ => Err(AppError::validation(format!("Unknown role: {}", raw))),
        }
    }

    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UserRole::Mentee => ROLE_MENTEE,
            UserRole::Mentor => ROLE_MENTOR,
            UserRole::Admin => ROLE_ADMIN,
        };
        write!(f, "{}", name)
    }
}

/// User domain entity.
///
/// Created once at registration and never mutated afterwards by the
/// authentication core; role is fixed at creation.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: HashedPassword,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh identity.
    pub fn new(
        id: UserId,
        email: Email,
        password_hash: HashedPassword,
        first_name: String,
        last_name: String,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            first_name,
            last_name,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Registration input data transfer object
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// User response (safe to return to client - never carries the hash)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "018f2d9a-7e61-7cd4-b2a6-0e5bbd0f8a37")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Given name
    #[schema(example = "Ada")]
    pub first_name: String,
    /// Family name
    #[schema(example = "Lovelace")]
    pub last_name: String,
    /// Marketplace role
    pub role: UserRole,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_uuid(),
            email: user.email.into_string(),
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
