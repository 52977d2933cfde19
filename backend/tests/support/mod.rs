//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! each suite pulls this module in with `mod support;` and uses the parts it
//! needs.
#![allow(dead_code)]

pub mod cluster;
pub mod cluster_skip;
pub mod database;
pub mod embedded_postgres;

pub use cluster::shared_cluster;
pub use cluster_skip::handle_cluster_setup_failure;
pub use database::{DatabaseContext, setup_database_context};
pub use embedded_postgres::provision_template_database;

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// The `Display` implementation of `postgres::Error` collapses database
/// errors to `db error`, hiding the SQLSTATE and message.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );

    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }

    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }

    summary
}
