//! Back-office JSON API. Every handler runs the admin gate first.
//!
//! ```text
//! GET   /api/v1/admin/leads/{kind}?page=&pageSize=&status=
//! PATCH /api/v1/admin/leads/{kind}/{id}     {"status":"contacted"}
//! GET   /api/v1/admin/subscribers?page=&pageSize=&status=
//! GET   /api/v1/admin/users?page=&pageSize=
//! GET   /api/v1/admin/referrals/{code}
//! POST  /api/v1/admin/content
//! PATCH /api/v1/admin/content/{id}          {"published":true}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    Article, ArticleDraft, Error, LeadRecord, LeadStatus, NewArticle, Page, ReferralSummary,
    Subscriber, UserListing, Violations,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::cache_control::no_store_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    PageQuery, StatusPageQuery, lead_kind, missing_field, uuid_param,
};

/// Body of a lead status change.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct LeadStatusPatch {
    #[schema(example = "contacted")]
    pub status: Option<String>,
}

impl LeadStatusPatch {
    fn validate(self) -> Result<LeadStatus, Violations> {
        let mut v = Violations::default();
        let status = v.required("status", self.status, LeadStatus::parse);
        v.finish(|| status)
    }
}

/// Body of a publication toggle.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct PublishPatch {
    pub published: Option<bool>,
}

fn no_store<T: serde::Serialize>(body: &T) -> HttpResponse {
    HttpResponse::Ok().insert_header(no_store_header()).json(body)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/leads/{kind}",
    params(
        ("kind" = String, Path, description = "loans, insurance, callbacks, or referrals"),
        StatusPageQuery
    ),
    responses(
        (status = 200, description = "Leads, newest first", body = Page<LeadRecord>),
        (status = 400, description = "Bad query parameters", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "Unknown lead kind", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListLeads"
)]
#[get("/admin/leads/{kind}")]
pub async fn list_leads(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<StatusPageQuery>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let kind = lead_kind(&path)?;
    let (status, page) = query.lead_filter()?;
    let leads = state.desk.list(kind, status, page).await?;
    Ok(no_store(&leads))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/leads/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "loans, insurance, callbacks, or referrals"),
        ("id" = String, Path, description = "Lead id")
    ),
    request_body = LeadStatusPatch,
    responses(
        (status = 200, description = "Updated lead", body = LeadRecord),
        (status = 400, description = "Invalid status or id", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "Unknown lead", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateLeadStatus"
)]
#[patch("/admin/leads/{kind}/{id}")]
pub async fn update_lead_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<LeadStatusPatch>,
) -> ApiResult<web::Json<LeadRecord>> {
    let admin = require_admin(&state, &session).await?;
    let (kind, id) = path.into_inner();
    let kind = lead_kind(&kind)?;
    let id = uuid_param("id", &id)?;
    let status = payload.into_inner().validate()?;
    let lead = state.desk.update_status(kind, id, status).await?;
    info!(admin_id = %admin.id, lead_id = %id, "admin updated lead");
    Ok(web::Json(lead))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/subscribers",
    params(StatusPageQuery),
    responses(
        (status = 200, description = "Subscribers, newest first", body = Page<Subscriber>),
        (status = 400, description = "Bad query parameters", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListSubscribers"
)]
#[get("/admin/subscribers")]
pub async fn list_subscribers(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<StatusPageQuery>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let (status, page) = query.subscriber_filter()?;
    let subscribers = state.subscriptions.list(status, page).await?;
    Ok(no_store(&subscribers))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Users with referee counts", body = Page<UserListing>),
        (status = 400, description = "Bad paging parameters", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let page = query.page_request()?;
    let users = state.accounts.list_users(page).await?;
    Ok(no_store(&users))
}

/// Referees of any code. Unknown codes yield an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/admin/referrals/{code}",
    params(("code" = String, Path, description = "Refer code")),
    responses(
        (status = 200, description = "Referral credit for the code", body = ReferralSummary),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminReferralsForCode"
)]
#[get("/admin/referrals/{code}")]
pub async fn referrals_for_code(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let summary = state.referrals.summary_for_code(&path).await?;
    Ok(no_store(&summary))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/content",
    request_body = ArticleDraft,
    responses(
        (status = 201, description = "Article created", body = Article),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 409, description = "Slug already used in this section", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminCreateArticle"
)]
#[post("/admin/content")]
pub async fn create_article(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ArticleDraft>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&state, &session).await?;
    let draft = NewArticle::validate(payload.into_inner())?;
    let article = state.content.create(draft).await?;
    info!(admin_id = %admin.id, article_id = %article.id, slug = %article.slug, "article created");
    Ok(HttpResponse::Created().json(article))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/content/{id}",
    params(("id" = String, Path, description = "Article id")),
    request_body = PublishPatch,
    responses(
        (status = 200, description = "Updated article", body = Article),
        (status = 400, description = "Missing flag or bad id", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "Unknown article", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminPublishArticle"
)]
#[patch("/admin/content/{id}")]
pub async fn publish_article(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PublishPatch>,
) -> ApiResult<web::Json<Article>> {
    let admin = require_admin(&state, &session).await?;
    let id = uuid_param("id", &path)?;
    let published = payload
        .into_inner()
        .published
        .ok_or_else(|| missing_field("published"))?;
    let article = state.content.set_published(id, published).await?;
    info!(admin_id = %admin.id, article_id = %id, published, "article publication changed");
    Ok(web::Json(article))
}
