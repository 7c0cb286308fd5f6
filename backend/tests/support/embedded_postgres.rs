//! Embedded PostgreSQL bootstrap for the Diesel adapter suites.
//!
//! One cluster is shared per test binary. Every test gets its own temporary
//! database with the crate's migrations applied, so suites never observe
//! each other's rows.

use std::time::Duration;

use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use spotting::outbound::persistence::run_pending_migrations;
use tokio::runtime::Runtime;

const BOOTSTRAP_ATTEMPTS: u32 = 4;
const BOOTSTRAP_BACKOFF: Duration = Duration::from_millis(500);

/// Start, or reuse, the cluster shared by this test binary.
///
/// The first bootstrap downloads PostgreSQL binaries, which fails
/// intermittently on busy runners; attempts back off exponentially.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 0;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(err) if attempt + 1 < BOOTSTRAP_ATTEMPTS => {
                let delay = BOOTSTRAP_BACKOFF * 2_u32.pow(attempt);
                eprintln!(
                    "pg-embed: bootstrap attempt {} failed, retrying in {delay:?}: {err:?}",
                    attempt + 1
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(format!("bootstrap cluster: {err:?}")),
        }
    }
}

/// Create a fresh database on `cluster` and bring its schema up to date.
///
/// The returned guard drops the database when it goes out of scope.
pub fn provision_migrated_database(
    cluster: &ClusterHandle,
    runtime: &Runtime,
) -> Result<TemporaryDatabase, String> {
    let database = cluster
        .create_temporary_database()
        .map_err(|err| format!("create database: {err:?}"))?;
    let url = database.url().to_string();
    runtime
        .block_on(run_pending_migrations(&url))
        .map_err(|err| format!("migrate {url}: {err}"))?;
    Ok(database)
}
