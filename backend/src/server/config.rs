//! Process settings and the assembled server configuration.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

use finlead::domain::AdminAllowList;
use finlead::inbound::http::session_config::{BuildMode, SessionSettings};
use finlead::inbound::http::state::{AuthSettings, DEFAULT_SIGN_IN_PATH};
use finlead::outbound::persistence::DbPool;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_HOST: &str = "0.0.0.0";

/// Settings loaded from CLI flags, `FINLEAD_*` variables and config files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FINLEAD")]
pub struct AppSettings {
    /// Interface to bind. Defaults to all interfaces.
    pub host: Option<String>,
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// PostgreSQL URL. Without it the server keeps data in memory.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
    /// Comma-separated emails granted the admin role at sign-in.
    pub admin_emails: Option<String>,
    /// Shared secret the sign-in endpoint requires. Mandatory in release
    /// builds.
    pub sign_in_secret: Option<String>,
    /// Where the admin pages send anonymous visitors.
    pub sign_in_path: Option<String>,
}

impl AppSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn sign_in_path(&self) -> &str {
        self.sign_in_path.as_deref().unwrap_or(DEFAULT_SIGN_IN_PATH)
    }

    pub fn admin_allow_list(&self) -> AdminAllowList {
        AdminAllowList::parse(self.admin_emails.as_deref().unwrap_or_default())
    }

    /// Sign-in settings for `mode`.
    ///
    /// The sign-in endpoint trusts the email it is given, so without a secret
    /// anyone could claim an allow-listed address.
    ///
    /// # Errors
    /// Returns an [`std::io::Error`] in release builds when
    /// `FINLEAD_SIGN_IN_SECRET` is missing or empty.
    pub fn auth_settings(&self, mode: BuildMode) -> std::io::Result<AuthSettings> {
        let auth = AuthSettings::default().with_sign_in_path(self.sign_in_path());
        match (self.sign_in_secret.as_deref(), mode) {
            (Some(secret), _) if !secret.is_empty() => Ok(auth.with_sign_in_secret(secret)),
            (_, BuildMode::Release) => Err(std::io::Error::other(
                "FINLEAD_SIGN_IN_SECRET must be set in release builds",
            )),
            (_, BuildMode::Debug) => {
                warn!("FINLEAD_SIGN_IN_SECRET unset; sign-in accepts any caller");
                Ok(auth)
            }
        }
    }

    /// Socket address built from `host` and `port`.
    ///
    /// # Errors
    /// Returns an [`std::io::Error`] when `host` is not an IP address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let host = self.host();
        host.parse()
            .map(|ip| SocketAddr::new(ip, self.port))
            .map_err(|err| std::io::Error::other(format!("invalid FINLEAD_HOST '{host}': {err}")))
    }
}

/// Everything `create_server` needs.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) admins: AdminAllowList,
    pub(crate) auth: AuthSettings,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
            key_fingerprint: _,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            admins: AdminAllowList::default(),
            auth: AuthSettings::default(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Back the repositories with PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_access(mut self, admins: AdminAllowList, auth: AuthSettings) -> Self {
        self.admins = admins;
        self.auth = auth;
        self
    }

    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
