//! # Boundary Validation
//!
//! Each validator checks one field and returns `Result<_, FieldError>`.
//! Callers feed the results into a `ValidationErrors` collector so that a
//! request with several bad fields reports all of them at once.

use crate::primitives::MAX_EMAIL_LENGTH;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

/// Whether `email` has valid address syntax (local part, `@`, dotted domain).
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

// =============================================================================
// FIELD ERRORS
// =============================================================================

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found in one request, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding exactly one error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Record a validator result, keeping the value on success.
    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether any error was recorded against `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

// =============================================================================
// VALIDATORS
// =============================================================================

/// Required free text: anything but blank. Length is not bounded.
pub fn require_text(field: &str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, "must not be empty"));
    }
    Ok(())
}

/// Email address syntax.
pub fn require_email(field: &str, value: &str) -> Result<(), FieldError> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(FieldError::new(field, "value is not a valid email address"))
    }
}

/// Non-negative integer, narrowed to `u64`.
pub fn require_non_negative(field: &str, value: i64) -> Result<u64, FieldError> {
    u64::try_from(value)
        .map_err(|_| FieldError::new(field, "must be greater than or equal to 0"))
}

/// Timestamp strictly before `now`.
pub fn require_past(
    field: &str,
    value: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, FieldError> {
    if value < now {
        Ok(value)
    } else {
        Err(FieldError::new(field, "must be in the past"))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_valid_email() {
        let emails: Vec<(&str, bool)> = vec![
            ("Sincere@april.biz", true),
            ("Shanna@melissa.tv", true),
            ("first.last+tag@sub.example.org", true),
            ("test.com", false),
            ("test@test", false),
            ("test@@test.com", false),
            ("test@#test.com", false),
            ("", false),
            (" Sincere@april.biz", false),
        ];

        for (email, expected) in emails {
            assert_eq!(is_valid_email(email), expected, "{}", email);
        }
    }

    #[test]
    fn overlong_email_rejected() {
        let local = "a".repeat(250);
        assert!(!is_valid_email(&format!("{}@example.com", local)));
    }

    #[test]
    fn require_text_rejects_blank() {
        assert!(require_text("name", "").is_err());
        assert!(require_text("name", "   ").is_err());
        assert!(require_text("name", "Sol").is_ok());
    }

    #[test]
    fn require_text_accepts_long_names() {
        let long = "x".repeat(4096);
        assert!(require_text("name", &long).is_ok());
    }

    #[test]
    fn require_non_negative_bounds() {
        assert_eq!(require_non_negative("population_millions", 0), Ok(0));
        assert_eq!(require_non_negative("population_millions", 42), Ok(42));
        assert!(require_non_negative("population_millions", -1).is_err());
    }

    #[test]
    fn require_past_is_strict() {
        let now = Utc::now();
        assert!(require_past("established_on", now - Duration::seconds(1), now).is_ok());
        assert!(require_past("established_on", now, now).is_err());
        assert!(require_past("established_on", now + Duration::days(1), now).is_err());
    }

    #[test]
    fn collector_keeps_every_error() {
        let mut errors = ValidationErrors::new();
        errors.check(require_text("name", ""));
        errors.check(require_email("supreme_commander", "nope"));
        let kept = errors.check(require_non_negative("population_millions", 5));

        assert_eq!(kept, Some(5));
        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("name"));
        assert!(errors.has_field("supreme_commander"));
        assert_eq!(
            errors.to_string(),
            "name: must not be empty; supreme_commander: value is not a valid email address"
        );
    }
}
