//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel rows and domain types. Validation stays in the domain.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Database errors map onto each port's error
//!   enum; unique violations are recognised by constraint name.
//! - **Embedded migrations**: `backend/migrations` is compiled into the
//!   binary and applied with [`run_migrations`].
//!
//! # Example
//!
//! ```ignore
//! use finlead::outbound::persistence::{DbPool, PoolConfig, DieselLeadRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/finlead")).await?;
//! let leads = DieselLeadRepository::new(pool);
//! ```

mod diesel_article_repository;
mod diesel_basic_error_mapping;
pub(crate) mod diesel_helpers;
mod diesel_lead_repository;
mod diesel_subscriber_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

pub use diesel_article_repository::DieselArticleRepository;
pub use diesel_lead_repository::DieselLeadRepository;
pub use diesel_subscriber_repository::DieselSubscriberRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Schema migrations compiled from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying [`MIGRATIONS`].
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    #[error("failed to apply migrations: {0}")]
    Apply(String),
    #[error("migration task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Apply pending migrations on a blocking thread.
///
/// Returns the number of migrations applied.
pub async fn run_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| MigrationError::Apply(err.to_string()))
    })
    .await??;
    info!(applied, "database migrations complete");
    Ok(applied)
}
