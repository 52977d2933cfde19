//! User accounts and the referral codes that link them.
//!
//! Every account owns a [`ReferCode`] assigned at creation. An account may
//! also carry the code of the user who referred it; that link is written once
//! and never changed, which keeps the referral relation a forest.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::contact::{EmailAddress, NAME_MAX};
use super::validation::{FieldError, ViolationCode};

/// Length of generated refer codes.
pub const REFER_CODE_LEN: usize = 8;
/// Alphabet used for generated refer codes; omits `0`, `O`, `1`, and `I`.
pub const REFER_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Errors raised when parsing a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdError {
    #[error("user id must not be empty")]
    Empty,
    #[error("user id must be a valid UUID")]
    Invalid,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its canonical string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserIdError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserIdError::Empty);
        }
        if raw.trim() != raw {
            return Err(UserIdError::Invalid);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserIdError::Invalid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an identifier loaded from storage.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Name shown in the back-office and to referrers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Trim and validate a display name (1 to 100 characters).
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FieldError> {
        let trimmed = raw.as_ref().trim();
        if let Some(error) = FieldError::length(1, NAME_MAX, trimmed.chars().count()) {
            return Err(error);
        }
        if trimmed.chars().any(char::is_control) {
            return Err(FieldError::new(
                ViolationCode::InvalidCharacters,
                "must not contain control characters",
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Rehydrate a stored display name.
    pub fn from_trusted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

/// Access level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }

    /// Parse the storage representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A user's own shareable invitation code.
///
/// Lookups treat codes as opaque strings; only generation follows
/// [`REFER_CODE_ALPHABET`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct ReferCode(String);

impl ReferCode {
    /// Generate a random code from [`REFER_CODE_ALPHABET`].
    ///
    /// ```
    /// use finlead::domain::{ReferCode, REFER_CODE_LEN};
    ///
    /// let code = ReferCode::generate(&mut rand::thread_rng());
    /// assert_eq!(code.as_str().len(), REFER_CODE_LEN);
    /// ```
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..REFER_CODE_LEN)
            .map(|_| {
                let index = rng.gen_range(0..REFER_CODE_ALPHABET.len());
                char::from(REFER_CODE_ALPHABET.get(index).copied().unwrap_or(b'A'))
            })
            .collect();
        Self(code)
    }

    /// Interpret caller-supplied text as a code. Surrounding whitespace is
    /// ignored; blank input yields `None`.
    pub fn lookup(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Rehydrate a stored code.
    pub fn from_trusted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ReferCode> for String {
    fn from(value: ReferCode) -> Self {
        value.0
    }
}

/// Application user.
///
/// ## Invariants
/// - `refer_code` is unique across users and never changes.
/// - `referrer_code`, when present, is another user's `refer_code` and was
///   set when the row was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    #[schema(value_type = String, example = "asha@example.in")]
    pub email: EmailAddress,
    #[schema(value_type = String, example = "Asha Rao")]
    pub display_name: DisplayName,
    pub role: Role,
    #[schema(value_type = String, example = "K7QM2XPA")]
    pub refer_code: ReferCode,
    #[schema(value_type = Option<String>, example = "H3ZN8RWC")]
    pub referrer_code: Option<ReferCode>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the account may use the back-office.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Row shown in the admin user list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListing {
    #[serde(flatten)]
    pub user: User,
    /// Number of users whose referrer code is this user's code.
    pub referee_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rstest::rstest;

    #[rstest]
    #[case("", UserIdError::Empty)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserIdError::Invalid)]
    #[case("not-a-uuid", UserIdError::Invalid)]
    fn user_id_rejects_bad_input(#[case] raw: &str, #[case] expected: UserIdError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    fn generated_codes_use_the_unambiguous_alphabet() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..64 {
            let code = ReferCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), REFER_CODE_LEN);
            assert!(
                code.as_str()
                    .bytes()
                    .all(|byte| REFER_CODE_ALPHABET.contains(&byte))
            );
        }
    }

    #[rstest]
    #[case("  K7QM2XPA ", Some("K7QM2XPA"))]
    #[case("   ", None)]
    #[case("", None)]
    fn lookup_trims_and_ignores_blank_codes(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            ReferCode::lookup(raw).as_ref().map(ReferCode::as_str),
            expected
        );
    }

    #[rstest]
    fn role_round_trips_through_storage_form() {
        for role in [Role::Member, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("owner"), None);
    }

    #[rstest]
    fn display_name_is_trimmed() {
        let name = DisplayName::new("  Asha ").expect("valid name");
        assert_eq!(name.as_str(), "Asha");
        assert!(DisplayName::new("   ").is_err());
    }
}
