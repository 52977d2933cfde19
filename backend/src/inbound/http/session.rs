//! Cookie session access for handlers.
//!
//! The cookie carries nothing but the signed-in user's id. Everything else
//! (role, display name, refer code) is read from the user record on each
//! request so role changes apply without re-issuing cookies.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Handler-facing view of the Actix session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Bind the session to `user_id`, rotating the cookie first.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("session write failed: {error}")))
    }

    /// The signed-in user's id. A cookie holding something other than a UUID
    /// counts as signed out.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let stored = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("session read failed: {error}")))?;
        Ok(stored.and_then(|raw| {
            UserId::new(&raw)
                .inspect_err(|error| warn!(%error, "discarding malformed session user id"))
                .ok()
        }))
    }

    /// Like [`Self::user_id`] but answers `401` when nobody is signed in.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("sign-in required"))
    }

    /// Sign out: clear every key and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(Self::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const MEENA: &str = "6f1c1f0e-7b4e-4b55-9d8e-2a5d3c1b7e90";

    async fn sign_in(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = UserId::new(MEENA).expect("fixture id");
        session.persist_user(&id)?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user_id()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    async fn forge(session: Session) -> HttpResponse {
        session
            .insert(USER_ID_KEY, "../../etc/passwd")
            .expect("insert forged id");
        HttpResponse::Ok().finish()
    }

    async fn sign_out(session: SessionContext) -> HttpResponse {
        session.purge();
        HttpResponse::NoContent().finish()
    }

    fn cookie_of(res: &ServiceResponse) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    async fn call<S>(
        app: &S,
        method: &str,
        uri: &str,
        cookie: Option<Cookie<'static>>,
    ) -> ServiceResponse
    where
        S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let mut req = match method {
            "POST" => test::TestRequest::post(),
            _ => test::TestRequest::get(),
        }
        .uri(uri);
        if let Some(cookie) = cookie {
            req = req.cookie(cookie);
        }
        test::call_service(app, req.to_request()).await
    }

    #[actix_web::test]
    async fn signed_in_id_survives_the_round_trip_and_sign_out_expires_it() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/sign-in", web::get().to(sign_in))
                .route("/me", web::get().to(whoami))
                .route("/sign-out", web::post().to(sign_out)),
        )
        .await;

        let signed_in = call(&app, "GET", "/sign-in", None).await;
        let cookie = cookie_of(&signed_in);

        let me = call(&app, "GET", "/me", Some(cookie.clone())).await;
        assert_eq!(me.status(), StatusCode::OK);
        assert_eq!(test::read_body(me).await, MEENA);

        let signed_out = call(&app, "POST", "/sign-out", Some(cookie)).await;
        assert_eq!(signed_out.status(), StatusCode::NO_CONTENT);
        assert_eq!(cookie_of(&signed_out).value(), "");
    }

    #[actix_web::test]
    async fn anonymous_and_forged_sessions_are_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/forge", web::get().to(forge))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let anonymous = call(&app, "GET", "/me", None).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let forged = call(&app, "GET", "/forge", None).await;
        let forged_me = call(&app, "GET", "/me", Some(cookie_of(&forged))).await;
        assert_eq!(forged_me.status(), StatusCode::UNAUTHORIZED);
    }
}
