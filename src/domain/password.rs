//! Hashed password value object.
//!
//! DDD: Value object - immutable, compared by value.
//! Hashing itself lives in the `PasswordHasher` service; this type only
//! guarantees that what we carry around *looks like* an encoded hash.

use crate::config::MIN_HASH_LENGTH;
use crate::errors::{AppError, AppResult};

/// An opaque, encoded password hash (algorithm id + salt + digest).
///
/// Never contains the plaintext password. A hash shorter than
/// [`MIN_HASH_LENGTH`] indicates a bug in the hashing pipeline, not bad
/// user input, so construction fails with an internal error.
#[derive(Clone)]
pub struct HashedPassword(String);

// Don't expose hash material in debug output (security)
impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HashedPassword").field(&"[REDACTED]").finish()
    }
}

impl HashedPassword {
    /// Wrap an existing encoded hash (from the hasher or the database).
    ///
    /// # Errors
    /// Returns an internal error if the hash is implausibly short.
    pub fn from_hash(hash: String) -> AppResult<Self> {
        if hash.len() < MIN_HASH_LENGTH {
            return Err(AppError::internal(format!(
                "Malformed password hash: {} bytes is below the minimum of {}",
                hash.len(),
                MIN_HASH_LENGTH
            )));
        }
        Ok(Self(hash))
    }

    /// Get the encoded hash for storage or verification.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the encoded hash string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl PartialEq for HashedPassword {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for HashedPassword {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_hash_accepted() {
        let encoded = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$wJkJbLQbOGiCIOZ1Gm3y0DXLT2ju7RHjzK3KdeXVvEA";
        let hash = HashedPassword::from_hash(encoded.to_string()).unwrap();
        assert_eq!(hash.as_str(), encoded);
    }

    #[test]
    fn test_short_hash_rejected_as_internal_error() {
        let result = HashedPassword::from_hash("tooshort".to_string());
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_debug_output_redacted() {
        let hash = HashedPassword::from_hash("x".repeat(64)).unwrap();
        let debug = format!("{:?}", hash);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("xxxx"));
    }
}
