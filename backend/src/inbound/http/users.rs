//! Sign-in, sign-out, and profile handlers.
//!
//! ```text
//! POST /api/v1/sign-in  {"email":"asha@example.in","displayName":"Asha","referrerCode":"H3ZN8RWC"}
//! POST /api/v1/sign-out
//! GET  /api/v1/users/me
//! ```
//!
//! Identity is verified upstream; the trusted frontend forwards it here and,
//! when configured, proves itself with the `x-sign-in-secret` header.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

use crate::domain::ports::SignInDraft;
use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{check_sign_in_secret, require_user};
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Create the account on first sign-in, refresh it afterwards, and start a
/// session.
#[utoipa::path(
    post,
    path = "/api/v1/sign-in",
    request_body = SignInDraft,
    params(
        ("x-sign-in-secret" = Option<String>, Header,
            description = "Shared secret of the trusted frontend")
    ),
    responses(
        (status = 200, description = "Signed in", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Untrusted caller", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "signIn",
    security([])
)]
#[post("/sign-in")]
pub async fn sign_in(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInDraft>,
) -> ApiResult<HttpResponse> {
    check_sign_in_secret(&req, &state.auth)?;
    let request = payload.into_inner().validate()?;
    let user = state.accounts.sign_in(request).await?;
    session.persist_user(&user.id)?;
    info!(user_id = %user.id, role = user.role.as_str(), "signed in");
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(user))
}

/// End the session. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/sign-out",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "signOut",
    security([])
)]
#[post("/sign-out")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = require_user(&state, &session).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(user))
}
