//! Process-wide embedded PostgreSQL cluster.
//!
//! `pg-embed-setup-unpriv` keeps one cluster alive for the lifetime of the
//! test binary. Suites share it and isolate themselves with per-test
//! databases cloned from a migrated template.

use std::time::Duration;

use pg_embedded_setup_unpriv::ClusterHandle;

const SHARED_CLUSTER_RETRIES: u32 = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);
const STABLE_PASSWORD: &str = "finlead_embedded_test";

/// Returns the shared cluster handle, retrying transient bootstrap failures.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < SHARED_CLUSTER_RETRIES => {
                eprintln!(
                    "pg-embed: attempt {attempt}/{SHARED_CLUSTER_RETRIES} failed: {error:?}"
                );
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY * attempt);
                attempt += 1;
            }
            Err(error) => return Err(format!("{error:?}")),
        }
    }
}

/// A reused data directory keeps the password it was initialised with, so
/// every test process must present the same one.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns threads, and the
        // library serialises access to the shared handle.
        unsafe {
            std::env::set_var("PG_PASSWORD", STABLE_PASSWORD);
        }
    }
}
