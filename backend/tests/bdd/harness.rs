//! Live HTTP server and shared world for the behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server runs the real route table
//! over in-memory repositories. `WorldFixture` stops it even when a step
//! panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use awc::Client;
use finlead::Trace;
use finlead::domain::ports::RandomReferCodes;
use finlead::domain::{AdminAllowList, TRACE_ID_HEADER};
use finlead::inbound::http::error::{json_config, query_config};
use finlead::inbound::http::routes::{configure_admin_pages, configure_api};
use finlead::inbound::http::state::{AuthSettings, HttpState, HttpStatePorts, Repositories};
use finlead::outbound::memory::{
    MemoryArticleRepository, MemoryLeadRepository, MemorySubscriberRepository,
    MemoryUserRepository,
};
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

/// Addresses granted the admin role by the harness server.
pub(crate) const ADMIN_EMAILS: &str = "ops@example.in";

/// What the last request produced.
#[derive(Debug, Default)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) trace_id: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) session_cookie: Option<String>,
    pub(crate) body: Option<Value>,
}

pub(crate) struct HttpWorld {
    runtime: Runtime,
    local: LocalSet,
    base_url: String,
    server: ServerHandle,
    /// Session cookie per signed-in email.
    pub(crate) sessions: HashMap<String, String>,
    /// Refer code per signed-in email.
    pub(crate) refer_codes: HashMap<String, String>,
    pub(crate) last: Option<Reply>,
}

impl HttpWorld {
    pub(crate) fn last(&self) -> &Reply {
        self.last.as_ref().expect("a request was sent")
    }

    pub(crate) fn last_body(&self) -> &Value {
        self.last().body.as_ref().expect("response has a JSON body")
    }
}

pub(crate) type SharedWorld = Rc<RefCell<HttpWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(&self.world);
    }
}

fn shutdown(world: &SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so the world stays
    // borrowed during `block_on`. The future must not touch the world.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::hours(2)))
        .build()
}

fn memory_state() -> HttpState {
    let ports = HttpStatePorts::from_repositories(
        Repositories {
            users: Arc::new(MemoryUserRepository::default()),
            leads: Arc::new(MemoryLeadRepository::default()),
            subscribers: Arc::new(MemorySubscriberRepository::default()),
            articles: Arc::new(MemoryArticleRepository::default()),
        },
        Arc::new(AdminAllowList::parse(ADMIN_EMAILS)),
        Arc::new(RandomReferCodes),
        Arc::new(mockable::DefaultClock),
    );
    HttpState::new(ports, AuthSettings::default())
}

async fn spawn_server() -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let state = web::Data::new(memory_state());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(session_middleware(key.clone()))
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure_api))
            .configure(configure_admin_pages)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{addr}"), handle))
}

pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let (base_url, server) = local
        .block_on(&runtime, spawn_server())
        .expect("harness server starts");

    WorldFixture {
        world: Rc::new(RefCell::new(HttpWorld {
            runtime,
            local,
            base_url,
            server,
            sessions: HashMap::new(),
            refer_codes: HashMap::new(),
            last: None,
        })),
    }
}

/// Send a request, optionally as the signed-in owner of `acting_as`, and
/// record the reply in the world.
pub(crate) fn send(
    world: &SharedWorld,
    method: Method,
    path: &str,
    acting_as: Option<&str>,
    payload: Option<Value>,
) {
    let cookie = acting_as.map(|email| {
        world
            .borrow()
            .sessions
            .get(email)
            .cloned()
            .unwrap_or_else(|| panic!("{email} has no session"))
    });
    let path = path.to_owned();
    let label = format!("{method} {path}");

    let reply = with_world_async(world, |base_url| async move {
        let client = Client::builder().disable_redirects().finish();
        let mut request = client.request(method, format!("{base_url}{path}"));
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        let mut response = match payload {
            Some(payload) => request.send_json(&payload).await.expect(&label),
            None => request.send().await.expect(&label),
        };
        let header_value = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        let trace_id = header_value(TRACE_ID_HEADER);
        let location = header_value(header::LOCATION.as_str());
        let session_cookie = header_value(header::SET_COOKIE.as_str())
            .and_then(|raw| raw.split(';').next().map(str::to_owned));
        let status = response.status().as_u16();
        let bytes = response.body().await.expect(&label);
        Reply {
            status,
            trace_id,
            location,
            session_cookie,
            body: serde_json::from_slice(&bytes).ok(),
        }
    });

    world.borrow_mut().last = Some(reply);
}

/// Sign in through the API and keep the session cookie for `email`.
pub(crate) fn sign_in(world: &SharedWorld, name: &str, email: &str, referrer_code: Option<String>) {
    send(
        world,
        Method::POST,
        "/api/v1/sign-in",
        None,
        Some(serde_json::json!({
            "email": email,
            "displayName": name,
            "referrerCode": referrer_code,
        })),
    );
    let mut ctx = world.borrow_mut();
    let reply = ctx.last();
    assert_eq!(reply.status, 200, "sign-in failed: {:?}", reply.body);
    let cookie = reply.session_cookie.clone().expect("sign-in sets a session");
    let refer_code = ctx.last_body()["referCode"]
        .as_str()
        .expect("user carries a refer code")
        .to_owned();
    ctx.sessions.insert(email.to_owned(), cookie);
    ctx.refer_codes.insert(email.to_owned(), refer_code);
}
