//! Helpers shared by the database-backed integration suites.
//!
//! Each file under `tests/` builds as its own crate, so suites pull these in
//! with `mod support;` rather than through the library.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{provision_migrated_database, shared_cluster};
