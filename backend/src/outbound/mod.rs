//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **memory**: process-local repositories for development and tests.
//!
//! Adapters only translate between domain types and storage; they contain
//! no business rules.

pub mod memory;
pub mod persistence;
