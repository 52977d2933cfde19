//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every JSON endpoint from the inbound layer plus the
//! health probes. Schemas referenced by the handlers are collected
//! automatically; the request drafts and enums are listed explicitly so the
//! document stays complete when a handler stops referencing them directly.
//!
//! The generated document is served by Swagger UI in debug builds and
//! exported via `cargo run --bin openapi-dump` for the frontend.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::SignInDraft;
use crate::domain::{
    Article, ArticleDraft, ArticleKind, ArticleSummary, CallbackDraft, EmploymentType, Error,
    ErrorCode, InsuranceQuoteDraft, InsuranceType, LeadKind, LeadReceipt, LeadRecord, LeadStatus,
    LoanApplicationDraft, LoanType, ReferralLeadDraft, ReferralProduct, ReferralSummary, Role,
    Subscriber, SubscriberStatus, SubscriptionDraft, UnsubscribeDraft, User, UserListing,
};
use crate::inbound::http::admin::{LeadStatusPatch, PublishPatch};
use crate::inbound::http::subscribers::UnsubscribeAck;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/sign-in.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Finlead API",
        description = "Lead intake, referrals, newsletter, content, and back-office endpoints."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::sign_in,
        crate::inbound::http::users::sign_out,
        crate::inbound::http::users::current_user,
        crate::inbound::http::referrals::my_referrals,
        crate::inbound::http::leads::submit_loan,
        crate::inbound::http::leads::submit_insurance,
        crate::inbound::http::leads::submit_callback,
        crate::inbound::http::leads::submit_referral,
        crate::inbound::http::subscribers::subscribe,
        crate::inbound::http::subscribers::unsubscribe,
        crate::inbound::http::content::list_content,
        crate::inbound::http::content::get_content,
        crate::inbound::http::admin::list_leads,
        crate::inbound::http::admin::update_lead_status,
        crate::inbound::http::admin::list_subscribers,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::referrals_for_code,
        crate::inbound::http::admin::create_article,
        crate::inbound::http::admin::publish_article,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        UserListing,
        SignInDraft,
        ReferralSummary,
        LoanApplicationDraft,
        InsuranceQuoteDraft,
        CallbackDraft,
        ReferralLeadDraft,
        LoanType,
        EmploymentType,
        InsuranceType,
        ReferralProduct,
        LeadKind,
        LeadStatus,
        LeadReceipt,
        LeadRecord,
        LeadStatusPatch,
        SubscriptionDraft,
        UnsubscribeDraft,
        UnsubscribeAck,
        Subscriber,
        SubscriberStatus,
        ArticleKind,
        ArticleDraft,
        Article,
        ArticleSummary,
        PublishPatch,
    )),
    tags(
        (name = "users", description = "Sign-in and the current account"),
        (name = "referrals", description = "Referral credit"),
        (name = "leads", description = "Public lead forms"),
        (name = "subscribers", description = "Newsletter subscriptions"),
        (name = "content", description = "Published news, reports, and materials"),
        (name = "admin", description = "Back-office operations for admins"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
