//! A migrated temporary database with a pool and the runtime that drives it.

use std::future::Future;

use finlead::outbound::persistence::{DbPool, PoolConfig};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use tokio::runtime::Runtime;

use super::{provision_template_database, shared_cluster};

/// Field order matters: the pool must close before the database is dropped.
pub struct DatabaseContext {
    pub runtime: Runtime,
    pub pool: DbPool,
    pub database_url: String,
    _database: TemporaryDatabase,
}

impl DatabaseContext {
    /// Drive `future` to completion on the context runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

/// Provision a fresh database from the shared cluster and open a small pool.
pub fn setup_database_context() -> Result<DatabaseContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_template_database(cluster)?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(DatabaseContext {
        runtime,
        pool,
        database_url,
        _database: database,
    })
}
