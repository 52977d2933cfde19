//! Referral credit for the signed-in user.
//!
//! ```text
//! GET /api/v1/referrals/me
//! ```

use actix_web::{HttpResponse, get, web};

use crate::domain::{Error, ReferralSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// The caller's refer code with everyone who signed up using it.
#[utoipa::path(
    get,
    path = "/api/v1/referrals/me",
    responses(
        (status = 200, description = "Referral credit", body = ReferralSummary),
        (status = 401, description = "Not signed in", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["referrals"],
    operation_id = "myReferrals"
)]
#[get("/referrals/me")]
pub async fn my_referrals(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = require_user(&state, &session).await?;
    let summary = state.referrals.summary(&user).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(summary))
}

#[cfg(test)]
mod tests {
    use crate::inbound::http::test_utils::{TestHarness, sign_in_request};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    #[actix_web::test]
    async fn counts_users_who_signed_up_with_the_code() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness.app()).await;

        let res = actix_test::call_service(
            &app,
            sign_in_request("ravi@example.in", "Ravi Kumar", None).to_request(),
        )
        .await;
        let cookie = crate::inbound::http::test_utils::session_cookie(&res);
        let ravi: Value = actix_test::read_body_json(res).await;
        let code = ravi["referCode"].as_str().expect("code").to_owned();

        for (email, name) in [("asha@example.in", "Asha Rao"), ("meera@example.in", "Meera Iyer")] {
            let res = actix_test::call_service(
                &app,
                sign_in_request(email, name, Some(&code)).to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        let summary: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/referrals/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(summary["referCode"], code.as_str());
        assert_eq!(summary["refereeCount"], 2);
        assert_eq!(summary["referees"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn a_new_user_has_no_referees() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness.app()).await;
        let cookie = harness.signed_in_cookie(&app, "lone@example.in").await;

        let summary: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/referrals/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(summary["refereeCount"], 0);
        assert_eq!(summary["referees"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn requires_a_session() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness.app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/referrals/me")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
