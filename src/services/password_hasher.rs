//! Password hashing service.
//!
//! SOLID (SRP): Hashing and verification only; the stored shape lives
//! in the domain `HashedPassword` value object.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::domain::HashedPassword;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Well-formed Argon2id hash used when no stored hash exists.
///
/// SECURITY: verifying against this dummy keeps "user not found" and
/// "wrong password" statistically indistinguishable in time. The
/// parameters match [`Argon2::default`] so the work factor is identical
/// to a real verification.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Password hashing service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh random salt.
    fn hash(&self, plain: &str) -> AppResult<HashedPassword>;

    /// Verify a plaintext password against a stored hash.
    ///
    /// MUST run the full comparison even when `hash` is `None`
    /// (substituting [`DUMMY_HASH`]) so the two failure causes consume
    /// indistinguishable time. Returns `false` for a wrong password,
    /// never an error.
    fn verify(&self, plain: &str, hash: Option<&HashedPassword>) -> bool;
}

/// Argon2id implementation with default (adaptive, salted) parameters.
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }

    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }

    fn verify_encoded(plain: &str, encoded: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };
        Self::argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> AppResult<HashedPassword> {
        if plain.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let encoded = Self::argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;

        HashedPassword::from_hash(encoded.to_string())
    }

    fn verify(&self, plain: &str, hash: Option<&HashedPassword>) -> bool {
        let encoded = hash.map_or(DUMMY_HASH, |h| h.as_str());
        let matched = Self::verify_encoded(plain, encoded);
        // A dummy-hash comparison can never authenticate anyone.
        hash.is_some() && matched
    }
}
