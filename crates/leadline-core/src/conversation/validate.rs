//! Field validators for the collection stages.
//!
//! The rules are deliberately loose in places (the phone rule counts every
//! matched character, not digits alone); they mirror the production intake
//! form and must not be tightened without coordinating with the backend.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-\+\(\)]{10,}$").expect("phone regex"));

/// A local, recoverable validation failure.
///
/// Validation failures never advance the stage; the user is re-prompted with
/// the message carried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your full name (2-100 characters).")]
    InvalidName,
    #[error("That doesn't look like a valid email address. Please try again.")]
    InvalidEmail,
    #[error("Please enter a valid contact number (at least 10 digits).")]
    InvalidPhone,
    #[error("Please select date & time.")]
    MissingDateOrTime,
    #[error("Please pick a date that isn't in the past.")]
    DateInPast,
    #[error("That time slot is no longer available. Please pick a later one.")]
    SlotUnavailable,
}

/// Name: trimmed length in [2, 100].
pub fn validate_name(raw: &str) -> Result<(), ValidationError> {
    let len = raw.trim().chars().count();
    if (2..=100).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName)
    }
}

/// Email: one `@`, no whitespace, a dot in the domain part.
pub fn validate_email(raw: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(raw) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Phone: at least 10 characters drawn from digits, spaces, `-`, `+`, `(`, `)`.
///
/// Note this counts all matched characters, not digits alone.
pub fn validate_phone(raw: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(raw) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}
