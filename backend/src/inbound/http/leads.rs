//! Public lead intake forms.
//!
//! ```text
//! POST /api/v1/leads/loans
//! POST /api/v1/leads/insurance
//! POST /api/v1/leads/callbacks
//! POST /api/v1/leads/referrals   (session required)
//! ```
//!
//! Each handler validates the whole body first; nothing is written unless
//! every field passes.

use actix_web::{HttpResponse, post, web};

use crate::domain::{
    CallbackDraft, CallbackRequest, Error, InsuranceQuoteDraft, InsuranceQuoteRequest,
    LeadReceipt, LeadSubmission, LoanApplication, LoanApplicationDraft, ReferralLead,
    ReferralLeadDraft,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

async fn accept(state: &HttpState, submission: LeadSubmission) -> ApiResult<HttpResponse> {
    let receipt = state.intake.submit(submission).await?;
    Ok(HttpResponse::Created().json(receipt))
}

#[utoipa::path(
    post,
    path = "/api/v1/leads/loans",
    request_body = LoanApplicationDraft,
    responses(
        (status = 201, description = "Application received", body = LeadReceipt),
        (status = 400, description = "Validation failed", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["leads"],
    operation_id = "submitLoanApplication",
    security([])
)]
#[post("/leads/loans")]
pub async fn submit_loan(
    state: web::Data<HttpState>,
    payload: web::Json<LoanApplicationDraft>,
) -> ApiResult<HttpResponse> {
    let lead = LoanApplication::validate(payload.into_inner())?;
    accept(&state, LeadSubmission::Loan(lead)).await
}

#[utoipa::path(
    post,
    path = "/api/v1/leads/insurance",
    request_body = InsuranceQuoteDraft,
    responses(
        (status = 201, description = "Quote request received", body = LeadReceipt),
        (status = 400, description = "Validation failed", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["leads"],
    operation_id = "submitInsuranceQuote",
    security([])
)]
#[post("/leads/insurance")]
pub async fn submit_insurance(
    state: web::Data<HttpState>,
    payload: web::Json<InsuranceQuoteDraft>,
) -> ApiResult<HttpResponse> {
    let lead = InsuranceQuoteRequest::validate(payload.into_inner())?;
    accept(&state, LeadSubmission::Insurance(lead)).await
}

#[utoipa::path(
    post,
    path = "/api/v1/leads/callbacks",
    request_body = CallbackDraft,
    responses(
        (status = 201, description = "Callback booked", body = LeadReceipt),
        (status = 400, description = "Validation failed", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["leads"],
    operation_id = "submitCallbackRequest",
    security([])
)]
#[post("/leads/callbacks")]
pub async fn submit_callback(
    state: web::Data<HttpState>,
    payload: web::Json<CallbackDraft>,
) -> ApiResult<HttpResponse> {
    let lead = CallbackRequest::validate(payload.into_inner())?;
    accept(&state, LeadSubmission::Callback(lead)).await
}

/// Refer a friend. The referrer code always comes from the caller's account.
#[utoipa::path(
    post,
    path = "/api/v1/leads/referrals",
    request_body = ReferralLeadDraft,
    responses(
        (status = 201, description = "Referral received", body = LeadReceipt),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["leads"],
    operation_id = "submitReferralLead"
)]
#[post("/leads/referrals")]
pub async fn submit_referral(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReferralLeadDraft>,
) -> ApiResult<HttpResponse> {
    let user = require_user(&state, &session).await?;
    let lead = ReferralLead::validate(payload.into_inner(), user.refer_code)?;
    accept(&state, LeadSubmission::Referral(lead)).await
}
