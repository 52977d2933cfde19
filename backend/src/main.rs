//! Backend entry-point: loads settings, prepares persistence, and serves the
//! JSON API, the back-office pages, and the health probes.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use finlead::inbound::http::health::HealthState;
use finlead::inbound::http::session_config::{BuildMode, session_settings_from_env};
use finlead::outbound::persistence::{DbPool, PoolConfig, run_migrations};

use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let mode = BuildMode::from_debug_assertions();
    let session = session_settings_from_env(&DefaultEnv::new(), mode)
        .map_err(|e| std::io::Error::other(format!("invalid session configuration: {e}")))?;

    let mut config = ServerConfig::new(session, settings.bind_addr()?)
        .with_access(settings.admin_allow_list(), settings.auth_settings(mode)?);

    if let Some(database_url) = settings.database_url.as_deref() {
        if settings.run_migrations {
            run_migrations(database_url)
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?;
        }
        let mut pool_config = PoolConfig::new(database_url);
        if let Some(max) = settings.db_max_connections {
            pool_config = pool_config.with_max_size(max);
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(server::prometheus()?));
    }

    info!(
        addr = %settings.bind_addr()?,
        persistence = if settings.database_url.is_some() { "postgres" } else { "memory" },
        "starting server"
    );
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
