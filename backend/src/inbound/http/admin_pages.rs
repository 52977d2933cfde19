//! Server-rendered back-office pages.
//!
//! Anonymous visitors are redirected to the sign-in page and signed-in
//! members to `/`. Pages are never cached.

use std::collections::HashMap;

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, web};

use crate::domain::{LeadKind, LeadStatus, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::admin_access;
use crate::inbound::http::cache_control::no_store_header;
use crate::inbound::http::html;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageQuery, lead_kind};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn page(title: &str, admin: &User, body: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .insert_header(no_store_header())
        .body(html::layout(title, admin, body))
}

/// Run the admin gate, yielding either the admin or the redirect to send.
async fn gate(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<Result<User, HttpResponse>> {
    Ok(admin_access(state, session)
        .await?
        .into_page_result(&state.auth))
}

/// Lead counts per kind and status.
#[get("/admin")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let admin = match gate(&state, &session).await? {
        Ok(admin) => admin,
        Err(redirect) => return Ok(redirect),
    };
    let counts: HashMap<(LeadKind, LeadStatus), u64> = state
        .desk
        .status_counts()
        .await?
        .into_iter()
        .map(|count| ((count.kind, count.status), count.count))
        .collect();

    let mut headers = vec!["Lead type"];
    headers.extend(LeadStatus::ALL.iter().map(|status| status.as_str()));
    headers.push("Total");
    let rows = LeadKind::ALL.iter().map(|&kind| {
        let per_status: Vec<u64> = LeadStatus::ALL
            .iter()
            .map(|&status| counts.get(&(kind, status)).copied().unwrap_or(0))
            .collect();
        let mut row = vec![kind.title().to_owned()];
        row.extend(per_status.iter().map(u64::to_string));
        row.push(per_status.iter().sum::<u64>().to_string());
        row
    });
    Ok(page("Dashboard", &admin, &html::table(&headers, rows)))
}

/// One page of leads of a kind, newest first.
#[get("/admin/leads/{kind}")]
pub async fn leads(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let admin = match gate(&state, &session).await? {
        Ok(admin) => admin,
        Err(redirect) => return Ok(redirect),
    };
    let kind = lead_kind(&path)?;
    let leads = state.desk.list(kind, None, query.page_request()?).await?;

    let rows = leads.items.iter().map(|lead| {
        vec![
            lead.created_at.format(TIMESTAMP_FORMAT).to_string(),
            lead.submission.contact_name().to_owned(),
            lead.submission.contact_phone().to_owned(),
            lead.submission.product_label().to_owned(),
            lead.status.as_str().to_owned(),
        ]
    });
    let mut body = html::table(&["Received", "Name", "Phone", "Product", "Status"], rows);
    body.push_str(&html::pager(&format!("/admin/leads/{}", kind.path_segment()), &leads));
    Ok(page(kind.title(), &admin, &body))
}

/// One page of newsletter subscribers, newest first.
#[get("/admin/subscribers")]
pub async fn subscribers(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let admin = match gate(&state, &session).await? {
        Ok(admin) => admin,
        Err(redirect) => return Ok(redirect),
    };
    let subscribers = state
        .subscriptions
        .list(None, query.page_request()?)
        .await?;

    let rows = subscribers.items.iter().map(|subscriber| {
        vec![
            subscriber.created_at.format(TIMESTAMP_FORMAT).to_string(),
            subscriber.email.as_str().to_owned(),
            subscriber
                .name
                .as_ref()
                .map(|name| name.as_str().to_owned())
                .unwrap_or_default(),
            subscriber
                .source
                .as_ref()
                .map(|source| source.as_str().to_owned())
                .unwrap_or_default(),
            subscriber.status.as_str().to_owned(),
        ]
    });
    let mut body = html::table(&["Joined", "Email", "Name", "Source", "Status"], rows);
    body.push_str(&html::pager("/admin/subscribers", &subscribers));
    Ok(page("Subscribers", &admin, &body))
}

#[cfg(test)]
mod tests {
    use crate::domain::{LeadSubmission, LoanApplication, LoanApplicationDraft};
    use crate::inbound::http::state::AuthSettings;
    use crate::inbound::http::test_utils::{ADMIN_EMAIL, TestHarness};
    use crate::domain::{Subscription, SubscriptionDraft};
    use actix_web::body::MessageBody;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use rstest::rstest;

    fn location(res: &ServiceResponse<impl MessageBody>) -> Option<&str> {
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    #[rstest]
    #[case("/admin")]
    #[case("/admin/leads/loans")]
    #[case("/admin/subscribers")]
    #[actix_web::test]
    async fn anonymous_visitors_are_sent_to_sign_in(#[case] uri: &str) {
        let harness = TestHarness::with_auth(AuthSettings::default().with_sign_in_path("/login"));
        let app = actix_test::init_service(harness.app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some("/login"));
    }

    #[rstest]
    #[case("/admin")]
    #[case("/admin/leads/callbacks")]
    #[case("/admin/subscribers")]
    #[actix_web::test]
    async fn members_are_sent_home(#[case] uri: &str) {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness.app()).await;
        let cookie = harness.signed_in_cookie(&app, "asha@example.in").await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some("/"));
    }

    #[actix_web::test]
    async fn lead_table_escapes_submitted_text() {
        let harness = TestHarness::new();
        let lead = LoanApplication::validate(LoanApplicationDraft {
            loan_type: Some("personal".to_owned()),
            full_name: Some("Asha <b>Rao</b>".to_owned()),
            email: Some("asha@example.in".to_owned()),
            phone: Some("9876543210".to_owned()),
            pan: Some("ABCDE1234F".to_owned()),
            city: Some("Pune".to_owned()),
            amount_requested: Some(500_000),
            employment_type: Some("salaried".to_owned()),
            ..LoanApplicationDraft::default()
        })
        .expect("names may carry markup characters");
        harness
            .state
            .intake
            .submit(LeadSubmission::Loan(lead))
            .await
            .expect("submit loan");
        let app = actix_test::init_service(harness.app()).await;
        let cookie = harness.signed_in_cookie(&app, ADMIN_EMAIL).await;

        let body = actix_test::call_and_read_body(
            &app,
            actix_test::TestRequest::get()
                .uri("/admin/leads/loans")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body = String::from_utf8(body.to_vec()).expect("utf-8 page");
        assert!(body.contains("Asha &lt;b&gt;Rao&lt;/b&gt;"));
        assert!(!body.contains("<b>Rao</b>"));
    }

    #[actix_web::test]
    async fn dashboard_counts_leads_per_status() {
        let harness = TestHarness::new();
        let lead = LoanApplication::validate(LoanApplicationDraft {
            loan_type: Some("home".to_owned()),
            full_name: Some("Asha Rao".to_owned()),
            email: Some("asha@example.in".to_owned()),
            phone: Some("9876543210".to_owned()),
            pan: Some("ABCDE1234F".to_owned()),
            city: Some("Pune".to_owned()),
            amount_requested: Some(2_500_000),
            employment_type: Some("salaried".to_owned()),
            ..LoanApplicationDraft::default()
        })
        .expect("valid loan");
        harness
            .state
            .intake
            .submit(LeadSubmission::Loan(lead))
            .await
            .expect("submit loan");
        let app = actix_test::init_service(harness.app()).await;
        let cookie = harness.signed_in_cookie(&app, ADMIN_EMAIL).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/admin")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
        let body = actix_test::read_body(res).await;
        let body = String::from_utf8(body.to_vec()).expect("utf-8 page");
        assert!(body.contains("<td>Loan applications</td><td>1</td>"));
    }

    #[actix_web::test]
    async fn subscriber_page_links_to_the_next_page() {
        let harness = TestHarness::new();
        for n in 0..3 {
            let subscription = Subscription::validate(SubscriptionDraft {
                email: Some(format!("reader{n}@example.in")),
                ..SubscriptionDraft::default()
            })
            .expect("valid subscription");
            harness
                .state
                .subscriptions
                .subscribe(subscription)
                .await
                .expect("subscribe");
        }
        let app = actix_test::init_service(harness.app()).await;
        let cookie = harness.signed_in_cookie(&app, ADMIN_EMAIL).await;

        let body = actix_test::call_and_read_body(
            &app,
            actix_test::TestRequest::get()
                .uri("/admin/subscribers?pageSize=2")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body = String::from_utf8(body.to_vec()).expect("utf-8 page");
        assert!(body.contains("href=\"/admin/subscribers?page=2\""));
        assert!(body.contains("reader2@example.in"));
    }
}
