//! Field-level validation shared by every form submission.
//!
//! Constructors of domain value types return [`FieldError`]. Submission
//! builders feed those results through a [`Violations`] collector so a single
//! `400` response can report every offending field at once.

use std::fmt;

use serde::Serialize;
use serde_json::json;

use super::Error;

/// Message used for the top-level validation error.
pub const VALIDATION_FAILED_MESSAGE: &str = "request validation failed";

/// Machine-readable reason attached to a field violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    MissingField,
    TooShort,
    TooLong,
    OutOfRange,
    InvalidCharacters,
    InvalidEmail,
    InvalidPhone,
    InvalidPan,
    InvalidSlug,
    InvalidUrl,
    InvalidChoice,
    InvalidUuid,
}

impl ViolationCode {
    /// Wire representation of the code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::OutOfRange => "out_of_range",
            Self::InvalidCharacters => "invalid_characters",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPhone => "invalid_phone",
            Self::InvalidPan => "invalid_pan",
            Self::InvalidSlug => "invalid_slug",
            Self::InvalidUrl => "invalid_url",
            Self::InvalidChoice => "invalid_choice",
            Self::InvalidUuid => "invalid_uuid",
        }
    }
}

/// A rejected value, described without reference to the field it came from.
///
/// `reason` reads as a predicate, e.g. `"must be a valid address"`, so the
/// collector can prefix it with the field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    code: ViolationCode,
    reason: String,
}

impl FieldError {
    /// Build a field error from a code and predicate phrase.
    pub fn new(code: ViolationCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// The violation code.
    pub fn code(&self) -> ViolationCode {
        self.code
    }

    /// The predicate phrase.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub(crate) fn length(min: usize, max: usize, actual: usize) -> Option<Self> {
        if actual < min {
            Some(Self::new(
                ViolationCode::TooShort,
                format!("must be at least {min} characters"),
            ))
        } else if actual > max {
            Some(Self::new(
                ViolationCode::TooLong,
                format!("must be at most {max} characters"),
            ))
        } else {
            None
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for FieldError {}

/// One offending field in a rejected submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub code: ViolationCode,
    pub message: String,
}

/// Accumulates violations across all fields of a submission.
///
/// ```
/// use finlead::domain::{EmailAddress, Violations};
///
/// let mut violations = Violations::default();
/// let email = violations.required("email", Some("not-an-email".to_owned()), EmailAddress::new);
/// assert!(email.is_none());
/// assert_eq!(violations.len(), 1);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    /// Record a violation for `field`.
    pub fn push(&mut self, field: &'static str, error: FieldError) {
        let message = format!("{field} {}", error.reason);
        self.0.push(FieldViolation {
            field,
            code: error.code,
            message,
        });
    }

    /// Append violations collected by another validator.
    pub fn absorb(&mut self, other: Violations) {
        self.0.extend(other.0);
    }

    /// Keep the value on success, record the error otherwise.
    pub fn check<T>(&mut self, field: &'static str, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(field, error);
                None
            }
        }
    }

    /// Validate a value that must be present.
    pub fn required<R, T>(
        &mut self,
        field: &'static str,
        raw: Option<R>,
        parse: impl FnOnce(R) -> Result<T, FieldError>,
    ) -> Option<T> {
        match raw {
            Some(raw) => self.check(field, parse(raw)),
            None => {
                self.push(
                    field,
                    FieldError::new(ViolationCode::MissingField, "is required"),
                );
                None
            }
        }
    }

    /// Validate a value that may be absent. The outer `Option` is `None` only
    /// when validation failed.
    pub fn optional<R, T>(
        &mut self,
        field: &'static str,
        raw: Option<R>,
        parse: impl FnOnce(R) -> Result<T, FieldError>,
    ) -> Option<Option<T>> {
        match raw {
            Some(raw) => self.check(field, parse(raw)).map(Some),
            None => Some(None),
        }
    }

    /// Number of recorded violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether every field passed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded violations in field order.
    pub fn as_slice(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Finish validation, producing `build()` when nothing was recorded.
    ///
    /// `build` is only called when every checked field produced a value, so
    /// callers may destructure their `Option`s inside it.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, Self> {
        if !self.is_empty() {
            return Err(self);
        }
        build().ok_or(self)
    }
}

impl From<Violations> for Error {
    fn from(violations: Violations) -> Self {
        Error::invalid_request(VALIDATION_FAILED_MESSAGE)
            .with_details(json!({ "fields": violations.0 }))
    }
}
