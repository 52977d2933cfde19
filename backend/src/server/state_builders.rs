//! Wire the HTTP state over PostgreSQL or in-memory repositories.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use finlead::domain::ports::RandomReferCodes;
use finlead::inbound::http::state::{HttpState, HttpStatePorts, Repositories};
use finlead::outbound::memory::{
    MemoryArticleRepository, MemoryLeadRepository, MemorySubscriberRepository,
    MemoryUserRepository,
};
use finlead::outbound::persistence::{
    DbPool, DieselArticleRepository, DieselLeadRepository, DieselSubscriberRepository,
    DieselUserRepository,
};

use super::ServerConfig;

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<
    DieselUserRepository,
    DieselLeadRepository,
    DieselSubscriberRepository,
    DieselArticleRepository,
> {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        leads: Arc::new(DieselLeadRepository::new(pool.clone())),
        subscribers: Arc::new(DieselSubscriberRepository::new(pool.clone())),
        articles: Arc::new(DieselArticleRepository::new(pool.clone())),
    }
}

fn memory_repositories() -> Repositories<
    MemoryUserRepository,
    MemoryLeadRepository,
    MemorySubscriberRepository,
    MemoryArticleRepository,
> {
    Repositories {
        users: Arc::new(MemoryUserRepository::default()),
        leads: Arc::new(MemoryLeadRepository::default()),
        subscribers: Arc::new(MemorySubscriberRepository::default()),
        articles: Arc::new(MemoryArticleRepository::default()),
    }
}

/// Build the shared handler state once; every worker clones the `Data`.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let admins = Arc::new(config.admins.clone());
    let codes = Arc::new(RandomReferCodes);
    let clock = Arc::new(mockable::DefaultClock);
    let ports = match &config.db_pool {
        Some(pool) => {
            HttpStatePorts::from_repositories(diesel_repositories(pool), admins, codes, clock)
        }
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            HttpStatePorts::from_repositories(memory_repositories(), admins, codes, clock)
        }
    };
    web::Data::new(HttpState::new(ports, config.auth.clone()))
}
