//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use serde_json::json;

use crate::domain::ports::RandomReferCodes;
use crate::domain::{AdminAllowList, EmailAddress};
use crate::inbound::http::error::{json_config, query_config};
use crate::inbound::http::routes::{configure_admin_pages, configure_api};
use crate::inbound::http::state::{AuthSettings, HttpState, HttpStatePorts, Repositories};
use crate::outbound::memory::{
    MemoryArticleRepository, MemoryLeadRepository, MemorySubscriberRepository,
    MemoryUserRepository,
};

/// Email on the admin allow-list of every [`TestHarness`].
pub const ADMIN_EMAIL: &str = "ops@example.in";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Full HTTP stack over in-memory repositories.
pub struct TestHarness {
    pub state: HttpState,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_auth(AuthSettings::default())
    }

    pub fn with_auth(auth: AuthSettings) -> Self {
        let admins = EmailAddress::new(ADMIN_EMAIL)
            .map(|email| AdminAllowList::from_emails([email]))
            .unwrap_or_default();
        let ports = HttpStatePorts::from_repositories(
            Repositories {
                users: Arc::new(MemoryUserRepository::default()),
                leads: Arc::new(MemoryLeadRepository::default()),
                subscribers: Arc::new(MemorySubscriberRepository::default()),
                articles: Arc::new(MemoryArticleRepository::default()),
            },
            Arc::new(admins),
            Arc::new(RandomReferCodes),
            Arc::new(mockable::DefaultClock),
        );
        Self {
            state: HttpState::new(ports, auth),
        }
    }

    /// The application as the server mounts it, minus tracing.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .wrap(test_session_middleware())
            .service(web::scope("/api/v1").configure(configure_api))
            .configure(configure_admin_pages)
    }

    /// Sign `email` in through the API and return the session cookie.
    pub async fn signed_in_cookie<S, B>(&self, app: &S, email: &str) -> Cookie<'static>
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    {
        let name = email.split('@').next().unwrap_or(email);
        let res =
            actix_test::call_service(app, sign_in_request(email, name, None).to_request()).await;
        assert!(res.status().is_success(), "sign-in failed: {}", res.status());
        session_cookie(&res)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// `POST /api/v1/sign-in` with the given identity.
pub fn sign_in_request(
    email: &str,
    display_name: &str,
    referrer_code: Option<&str>,
) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/sign-in")
        .set_json(json!({
            "email": email,
            "displayName": display_name,
            "referrerCode": referrer_code,
        }))
}

/// The session cookie set on `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}
