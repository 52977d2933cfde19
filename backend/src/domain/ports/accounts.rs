//! Driving port for sign-in and account queries.
//!
//! Identity is verified upstream; this port only turns a verified email into
//! an account, creating it on first sight.

use async_trait::async_trait;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::contact::non_blank;
use crate::domain::{
    DisplayName, EmailAddress, Error, Page, PageRequest, ReferCode, User, UserId, UserListing,
    Violations,
};

/// Sign-in payload forwarded by the trusted frontend.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInDraft {
    #[schema(example = "asha@example.in")]
    pub email: Option<String>,
    #[schema(example = "Asha Rao")]
    pub display_name: Option<String>,
    /// Refer code of the user who invited this one. Only honoured when the
    /// account is created.
    #[schema(example = "H3ZN8RWC")]
    pub referrer_code: Option<String>,
}

/// Validated sign-in request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub referrer_code: Option<ReferCode>,
}

impl SignInDraft {
    pub fn validate(self) -> Result<SignInRequest, Violations> {
        let mut v = Violations::default();
        let email = v.required("email", non_blank(self.email), EmailAddress::new);
        let display_name =
            v.required("displayName", non_blank(self.display_name), DisplayName::new);
        let referrer_code = self.referrer_code.as_deref().and_then(ReferCode::lookup);
        v.finish(|| {
            Some(SignInRequest {
                email: email?,
                display_name: display_name?,
                referrer_code,
            })
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Find or create the account for a verified identity.
    async fn sign_in(&self, request: SignInRequest) -> Result<User, Error>;

    /// Load the account behind a session.
    async fn profile(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Back-office user list with referee counts.
    async fn list_users(&self, page: PageRequest) -> Result<Page<UserListing>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn blank_referrer_code_is_ignored() {
        let request = SignInDraft {
            email: Some("asha@example.in".to_owned()),
            display_name: Some("Asha".to_owned()),
            referrer_code: Some("   ".to_owned()),
        }
        .validate()
        .expect("valid sign-in");
        assert_eq!(request.referrer_code, None);
    }

    #[rstest]
    fn missing_identity_fields_are_reported() {
        let violations = SignInDraft::default().validate().expect_err("invalid");
        let fields: Vec<_> = violations.as_slice().iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["email", "displayName"]);
    }
}
