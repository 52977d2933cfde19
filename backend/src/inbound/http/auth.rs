//! Identity and role checks used by HTTP handlers.
//!
//! Handlers call into here instead of reading the session directly, so the
//! "session points at a deleted user" case and the admin gate live in one
//! place. JSON routes turn a failed check into 401/403; the HTML back-office
//! turns it into a redirect.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use tracing::{info, warn};

use crate::domain::{Error, User};

use super::ApiResult;
use super::session::SessionContext;
use super::state::{AuthSettings, HttpState};

/// Header the trusted frontend uses to prove it forwarded the sign-in.
pub const SIGN_IN_SECRET_HEADER: &str = "x-sign-in-secret";

/// Outcome of the back-office role check.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminAccess {
    Granted(User),
    SignInRequired,
    Denied(User),
}

impl AdminAccess {
    /// JSON API view of the gate.
    pub fn into_api_result(self) -> ApiResult<User> {
        match self {
            Self::Granted(user) => Ok(user),
            Self::SignInRequired => Err(Error::unauthorized("sign-in required")),
            Self::Denied(_) => Err(Error::forbidden("admin access required")),
        }
    }

    /// HTML view of the gate: the admin, or a `303 See Other` response.
    pub fn into_page_result(self, auth: &AuthSettings) -> Result<User, HttpResponse> {
        match self {
            Self::Granted(user) => Ok(user),
            Self::SignInRequired => Err(see_other(auth.sign_in_path())),
            Self::Denied(_) => Err(see_other("/")),
        }
    }
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

/// The signed-in user, if the session names one that still exists.
///
/// A session whose user has disappeared is purged.
pub async fn current_user(state: &HttpState, session: &SessionContext) -> ApiResult<Option<User>> {
    let Some(id) = session.user_id()? else {
        return Ok(None);
    };
    match state.accounts.profile(&id).await? {
        Some(user) => Ok(Some(user)),
        None => {
            warn!(user_id = %id, "session refers to an unknown user; purging");
            session.purge();
            Ok(None)
        }
    }
}

/// The signed-in user or `401 Unauthorized`.
pub async fn require_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    current_user(state, session)
        .await?
        .ok_or_else(|| Error::unauthorized("sign-in required"))
}

/// Evaluate the back-office role gate against the stored user record.
pub async fn admin_access(state: &HttpState, session: &SessionContext) -> ApiResult<AdminAccess> {
    Ok(match current_user(state, session).await? {
        None => AdminAccess::SignInRequired,
        Some(user) if user.is_admin() => AdminAccess::Granted(user),
        Some(user) => {
            info!(user_id = %user.id, "non-admin refused back-office access");
            AdminAccess::Denied(user)
        }
    })
}

/// The signed-in admin, or 401/403 for the JSON API.
pub async fn require_admin(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    admin_access(state, session).await?.into_api_result()
}

/// Check the shared secret guarding the sign-in endpoint.
pub fn check_sign_in_secret(req: &HttpRequest, auth: &AuthSettings) -> ApiResult<()> {
    let presented = req
        .headers()
        .get(SIGN_IN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    if auth.accepts_sign_in_secret(presented) {
        Ok(())
    } else {
        warn!("sign-in rejected: missing or mismatched sign-in secret");
        Err(Error::unauthorized("sign-in must come from the trusted frontend"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::make_user;
    use crate::domain::{ErrorCode, Role};
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use rstest_bdd_macros::{given, then, when};

    fn admin() -> User {
        let mut user = make_user("ops@example.in", "Ops Desk", "ADMN0001", None);
        user.role = Role::Admin;
        user
    }

    #[given("an anonymous visitor")]
    fn an_anonymous_visitor() -> AdminAccess {
        AdminAccess::SignInRequired
    }

    #[given("a signed-in member")]
    fn a_signed_in_member() -> AdminAccess {
        AdminAccess::Denied(make_user("asha@example.in", "Asha Rao", "MEMB0001", None))
    }

    #[when("the admin API is called")]
    fn the_admin_api_is_called(access: AdminAccess) -> ApiResult<User> {
        access.into_api_result()
    }

    #[then("the API asks for a sign-in")]
    fn the_api_asks_for_a_sign_in(result: ApiResult<User>) {
        let error = result.expect_err("gate should refuse");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[then("the API forbids the call")]
    fn the_api_forbids_the_call(result: ApiResult<User>) {
        let error = result.expect_err("gate should refuse");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn anonymous_callers_must_sign_in() {
        let result = the_admin_api_is_called(an_anonymous_visitor());
        the_api_asks_for_a_sign_in(result);
    }

    #[rstest]
    fn members_are_forbidden() {
        let result = the_admin_api_is_called(a_signed_in_member());
        the_api_forbids_the_call(result);
    }

    #[rstest]
    fn admins_pass_the_gate() {
        let user = AdminAccess::Granted(admin())
            .into_api_result()
            .expect("admin passes");
        assert!(user.is_admin());
    }

    #[rstest]
    #[case(an_anonymous_visitor(), "/sign-in")]
    #[case(a_signed_in_member(), "/")]
    fn pages_redirect_refused_callers(#[case] access: AdminAccess, #[case] location: &str) {
        let response = access
            .into_page_result(&AuthSettings::default())
            .expect_err("redirect");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some(location)
        );
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some("nope"), false)]
    #[case(Some("frontend-secret"), true)]
    fn sign_in_secret_header_is_checked(#[case] header_value: Option<&str>, #[case] ok: bool) {
        let auth = AuthSettings::default().with_sign_in_secret("frontend-secret");
        let mut request = TestRequest::post();
        if let Some(value) = header_value {
            request = request.insert_header((SIGN_IN_SECRET_HEADER, value));
        }
        let result = check_sign_in_secret(&request.to_http_request(), &auth);
        assert_eq!(result.is_ok(), ok);
    }
}
