//! Token issuance and verification.
//!
//! Access tokens are short-lived and stateless. Refresh tokens are
//! longer-lived and signed with a *different* secret; the calling use
//! case additionally persists each refresh token as a `RefreshToken`
//! record, which is what makes revocation possible.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH};
use crate::domain::{AccessToken, RefreshTokenId, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    /// "access" or "refresh"; callers must reject a mismatch.
    pub token_type: String,
    /// Unique per token. For refresh tokens this is the id of the
    /// persisted record.
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed access/refresh pair.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: AccessToken,
    /// Raw signed refresh token as handed to the client.
    pub refresh_token: String,
    /// Identity of the server-side record the caller must persist.
    pub refresh_token_id: RefreshTokenId,
}

/// Token service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenService: Send + Sync {
    /// Sign a fresh access/refresh pair for a user.
    fn issue(&self, user: &User) -> AppResult<IssuedTokens>;

    /// Verify an access token's signature and expiry.
    fn verify_access(&self, raw: &str) -> AppResult<Claims>;

    /// Verify a refresh token's signature and expiry.
    fn verify_refresh(&self, raw: &str) -> AppResult<Claims>;
}

/// HS256 implementation with distinct access and refresh secrets.
pub struct JwtTokens {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtTokens {
    /// Build the signer/verifier pair from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret_bytes()),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_token_ttl_days),
        }
    }

    fn claims(user: &User, token_type: &str, jti: Uuid, ttl: Duration) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user.id.as_uuid(),
            email: user.email.as_str().to_string(),
            role: user.role.to_string(),
            token_type: token_type.to_string(),
            jti,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

impl TokenService for JwtTokens {
    fn issue(&self, user: &User) -> AppResult<IssuedTokens> {
        let access_claims = Self::claims(user, TOKEN_TYPE_ACCESS, Uuid::now_v7(), self.access_ttl);
        let access = encode(&Header::default(), &access_claims, &self.access_encoding)
            .map_err(|e| AppError::internal(format!("Access token signing failed: {}", e)))?;

        let refresh_token_id = RefreshTokenId::generate();
        let refresh_claims = Self::claims(
            user,
            TOKEN_TYPE_REFRESH,
            refresh_token_id.as_uuid(),
            self.refresh_ttl,
        );
        let refresh = encode(&Header::default(), &refresh_claims, &self.refresh_encoding)
            .map_err(|e| AppError::internal(format!("Refresh token signing failed: {}", e)))?;

        Ok(IssuedTokens {
            access_token: AccessToken::new(access)?,
            refresh_token: refresh,
            refresh_token_id,
        })
    }

    fn verify_access(&self, raw: &str) -> AppResult<Claims> {
        decode::<Claims>(raw, &self.access_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }

    fn verify_refresh(&self, raw: &str) -> AppResult<Claims> {
        decode::<Claims>(raw, &self.refresh_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidRefreshToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, HashedPassword, UserId, UserRole};

    fn test_user() -> User {
        User::new(
            UserId::generate(),
            Email::new("mentor@example.com").unwrap(),
            HashedPassword::from_hash("h".repeat(64)).unwrap(),
            "Grace".to_string(),
            "Hopper".to_string(),
            UserRole::Mentor,
        )
    }

    fn test_service() -> JwtTokens {
        JwtTokens::new(&Config::with_secrets(
            "test-access-secret-of-sufficient-len",
            "test-refresh-secret-of-sufficient-le",
        ))
    }

    #[test]
    fn test_issued_access_token_verifies() {
        let service = test_service();
        let user = test_user();

        let issued = service.issue(&user).unwrap();
        let claims = service.verify_access(issued.access_token.as_str()).unwrap();

        assert_eq!(claims.sub, user.id.as_uuid());
        assert_eq!(claims.email, "mentor@example.com");
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
    }

    #[test]
    fn test_issued_refresh_token_verifies_and_carries_record_id() {
        let service = test_service();
        let issued = service.issue(&test_user()).unwrap();

        let claims = service.verify_refresh(&issued.refresh_token).unwrap();
        assert_eq!(claims.token_type, TOKEN_TYPE_REFRESH);
        assert_eq!(claims.jti, issued.refresh_token_id.as_uuid());
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        // Distinct secrets: an access token can never pass refresh
        // verification, independent of the token_type check.
        let service = test_service();
        let issued = service.issue(&test_user()).unwrap();

        let result = service.verify_refresh(issued.access_token.as_str());
        assert!(matches!(result, Err(AppError::InvalidRefreshToken)));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = test_service();
        let issued = service.issue(&test_user()).unwrap();

        let result = service.verify_access(&issued.refresh_token);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_token_signed_with_other_key_rejected() {
        let service = test_service();
        let other = JwtTokens::new(&Config::with_secrets(
            "another-access-secret-of-enough-size",
            "another-refresh-secret-of-enough-siz",
        ));

        let issued = other.issue(&test_user()).unwrap();
        assert!(service.verify_refresh(&issued.refresh_token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = test_service();
        assert!(service.verify_refresh("not.a.jwt").is_err());
        assert!(service.verify_access("").is_err());
    }

    #[test]
    fn test_consecutive_pairs_are_distinct() {
        let service = test_service();
        let user = test_user();

        let first = service.issue(&user).unwrap();
        let second = service.issue(&user).unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }
}
