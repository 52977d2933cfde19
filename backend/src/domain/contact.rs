//! Validated contact details captured by the intake forms.
//!
//! Every constructor trims its input and returns a [`FieldError`] describing
//! the rejection, so submissions can report all bad fields together.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::validation::{FieldError, ViolationCode};

/// Upper bound accepted for an email address.
pub const EMAIL_MAX: usize = 254;
/// Bounds for a person's name.
pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
/// Bounds for a city name.
pub const CITY_MIN: usize = 2;
pub const CITY_MAX: usize = 80;
/// Upper bound for free-text notes.
pub const NOTE_MAX: usize = 2000;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PAN_RE: OnceLock<Regex> = OnceLock::new();
static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern).unwrap_or_else(|error| panic!("regex {pattern} failed: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    compiled(&EMAIL_RE, r"^[^@\s]+@[^@\s]+\.[^@\s.]{2,}$")
}

fn pan_regex() -> &'static Regex {
    compiled(&PAN_RE, "^[A-Z]{5}[0-9]{4}[A-Z]$")
}

fn slug_regex() -> &'static Regex {
    compiled(&SLUG_RE, "^[a-z0-9]+(?:-[a-z0-9]+)*$")
}

fn bounded_text(raw: &str, min: usize, max: usize) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if let Some(error) = FieldError::length(min, max, trimmed.chars().count()) {
        return Err(error);
    }
    if trimmed.chars().any(char::is_control) {
        return Err(FieldError::new(
            ViolationCode::InvalidCharacters,
            "must not contain control characters",
        ));
    }
    Ok(trimmed.to_owned())
}

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(into = "String")]
        pub struct $name(String);

        impl $name {
            /// Borrow the normalised value.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// Rehydrate a value that was validated before it was stored.
            pub fn from_trusted(value: impl Into<String>) -> Self {
                Self(value.into())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

string_newtype! {
    /// Lower-cased email address.
    ///
    /// ```
    /// use finlead::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Priya@Example.IN ").unwrap();
    /// assert_eq!(email.as_str(), "priya@example.in");
    /// assert!(EmailAddress::new("priya@localhost").is_err());
    /// ```
    EmailAddress
}

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FieldError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(FieldError::new(ViolationCode::MissingField, "is required"));
        }
        if normalised.len() > EMAIL_MAX {
            return Err(FieldError::new(
                ViolationCode::TooLong,
                format!("must be at most {EMAIL_MAX} characters"),
            ));
        }
        if !email_regex().is_match(&normalised) {
            return Err(FieldError::new(
                ViolationCode::InvalidEmail,
                "must be a valid address",
            ));
        }
        Ok(Self(normalised))
    }
}

string_newtype! {
    /// Ten-digit Indian mobile number without country prefix.
    ///
    /// ```
    /// use finlead::domain::PhoneNumber;
    ///
    /// let phone = PhoneNumber::new("+91 98765-43210").unwrap();
    /// assert_eq!(phone.as_str(), "9876543210");
    /// assert!(PhoneNumber::new("12345").is_err());
    /// ```
    PhoneNumber
}

impl PhoneNumber {
    /// Accepts an optional `+91`, `91`, or `0` prefix; spaces and hyphens are
    /// ignored. The remaining ten digits must start with 6-9.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FieldError> {
        let compact: String = raw
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);
        let national = match digits.len() {
            12 => digits.strip_prefix("91"),
            11 => digits.strip_prefix('0'),
            10 => Some(digits),
            _ => None,
        };
        match national {
            Some(number)
                if number.chars().all(|c| c.is_ascii_digit())
                    && number.starts_with(['6', '7', '8', '9']) =>
            {
                Ok(Self(number.to_owned()))
            }
            _ => Err(FieldError::new(
                ViolationCode::InvalidPhone,
                "must be a 10-digit Indian mobile number",
            )),
        }
    }
}

string_newtype! {
    /// Permanent Account Number in `AAAAA9999A` form.
    Pan
}

impl Pan {
    /// Upper-case and validate a PAN.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FieldError> {
        let normalised = raw.as_ref().trim().to_ascii_uppercase();
        if pan_regex().is_match(&normalised) {
            Ok(Self(normalised))
        } else {
            Err(FieldError::new(
                ViolationCode::InvalidPan,
                "must match the AAAAA9999A format",
            ))
        }
    }
}

string_newtype! {
    /// A person's name as entered on a form.
    PersonName
}

impl PersonName {
    /// Trim and length-check a name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FieldError> {
        bounded_text(raw.as_ref(), NAME_MIN, NAME_MAX).map(Self)
    }
}

string_newtype! {
    /// City the applicant lives in.
    City
}

impl City {
    /// Trim and length-check a city name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FieldError> {
        bounded_text(raw.as_ref(), CITY_MIN, CITY_MAX).map(Self)
    }
}

string_newtype! {
    /// Optional free-text message attached to a lead.
    Note
}

impl Note {
    /// Trim and bound a note. Blank notes are rejected so callers can map
    /// them to `None` before validation.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FieldError> {
        Self::bounded(raw, NOTE_MAX)
    }

    /// Trim and bound a note with a custom limit.
    pub fn bounded(raw: impl AsRef<str>, max: usize) -> Result<Self, FieldError> {
        let trimmed = raw.as_ref().trim();
        match FieldError::length(1, max, trimmed.chars().count()) {
            Some(error) => Err(error),
            None => Ok(Self(trimmed.to_owned())),
        }
    }
}

string_newtype! {
    /// Lower-case ASCII slug made of letters, digits, and single hyphens.
    Slug
}

impl Slug {
    /// Validate a slug.
    ///
    /// ```
    /// use finlead::domain::Slug;
    ///
    /// assert!(Slug::new("home-loans").is_ok());
    /// assert!(Slug::new("Home Loans").is_err());
    /// assert!(Slug::new("double--hyphen").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FieldError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.len() > 120 {
            return Err(FieldError::new(
                ViolationCode::TooLong,
                "must be at most 120 characters",
            ));
        }
        if slug_regex().is_match(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(FieldError::new(
                ViolationCode::InvalidSlug,
                "must contain lowercase letters, digits, and single hyphens",
            ))
        }
    }
}

/// Treat blank optional strings as absent.
pub(crate) fn non_blank(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}
