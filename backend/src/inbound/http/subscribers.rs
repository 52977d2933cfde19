//! Newsletter subscription endpoints.
//!
//! ```text
//! POST /api/v1/subscribers              {"email":"priya@example.in","source":"footer"}
//! POST /api/v1/subscribers/unsubscribe  {"email":"priya@example.in"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Error, SubscribeOutcome, Subscriber, SubscriberStatus, Subscription, SubscriptionDraft,
    UnsubscribeDraft,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Subscribe, or re-activate an existing subscription for the same email.
#[utoipa::path(
    post,
    path = "/api/v1/subscribers",
    request_body = SubscriptionDraft,
    responses(
        (status = 201, description = "New subscriber", body = Subscriber),
        (status = 200, description = "Existing subscriber re-activated", body = Subscriber),
        (status = 400, description = "Validation failed", body = Error)
    ),
    tags = ["subscribers"],
    operation_id = "subscribe",
    security([])
)]
#[post("/subscribers")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    payload: web::Json<SubscriptionDraft>,
) -> ApiResult<HttpResponse> {
    let subscription = Subscription::validate(payload.into_inner())?;
    Ok(match state.subscriptions.subscribe(subscription).await? {
        SubscribeOutcome::Created(subscriber) => HttpResponse::Created().json(subscriber),
        SubscribeOutcome::Reactivated(subscriber) => HttpResponse::Ok().json(subscriber),
    })
}

/// Public acknowledgement of an unsubscribe. Carries no stored details.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnsubscribeAck {
    #[schema(example = "unsubscribed")]
    pub status: SubscriberStatus,
}

#[utoipa::path(
    post,
    path = "/api/v1/subscribers/unsubscribe",
    request_body = UnsubscribeDraft,
    responses(
        (status = 200, description = "Unsubscribed", body = UnsubscribeAck),
        (status = 400, description = "Validation failed", body = Error),
        (status = 404, description = "Unknown email", body = Error)
    ),
    tags = ["subscribers"],
    operation_id = "unsubscribe",
    security([])
)]
#[post("/subscribers/unsubscribe")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    payload: web::Json<UnsubscribeDraft>,
) -> ApiResult<web::Json<UnsubscribeAck>> {
    let email = payload.into_inner().validate()?;
    let Subscriber { status, .. } = state.subscriptions.unsubscribe(&email).await?;
    Ok(web::Json(UnsubscribeAck { status }))
}
