//! Email value object.
//!
//! DDD: Value object - immutable, compared by value, validated at construction.

use serde::Serialize;
use validator::ValidateEmail;

use crate::errors::{AppError, AppResult};

/// A validated email address.
///
/// Construction is the only way to obtain an `Email`, so any instance
/// is guaranteed to satisfy the email grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and validate an email address.
    ///
    /// Leading/trailing whitespace is trimmed before validation.
    ///
    /// # Errors
    /// Returns a validation error if the address does not match
    /// the email grammar.
    pub fn new(raw: &str) -> AppResult<Self> {
        let value = raw.trim();
        if !value.validate_email() {
            return Err(AppError::validation("Invalid email format"));
        }
        Ok(Self(value.to_string()))
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email_accepted() {
        let email = Email::new("user@example.com").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn test_whitespace_trimmed() {
        let email = Email::new("  user@example.com  ").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn test_missing_at_sign_rejected() {
        assert!(Email::new("userexample.com").is_err());
    }

    #[test]
    fn test_missing_domain_rejected() {
        assert!(Email::new("user@").is_err());
    }

    #[test]
    fn test_empty_string_rejected() {
        assert!(Email::new("").is_err());
    }

    #[test]
    fn test_equality_by_value() {
        let a = Email::new("a@x.com").unwrap();
        let b = Email::new("a@x.com").unwrap();
        assert_eq!(a, b);
    }
}
