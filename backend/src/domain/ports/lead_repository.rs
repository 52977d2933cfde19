//! Driven port for lead storage.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{LeadKind, LeadRecord, LeadStatus, LeadStatusCount, Page, PageRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by lead repository adapters.
    pub enum LeadRepositoryError {
        Connection { message: String } => "lead repository connection failed: {message}",
        Query { message: String } => "lead repository query failed: {message}",
    }
}

/// Storage for every lead table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Insert a new lead into the table matching its kind.
    async fn insert(&self, record: &LeadRecord) -> Result<(), LeadRepositoryError>;

    /// Newest leads of `kind` first, optionally filtered by status.
    async fn list(
        &self,
        kind: LeadKind,
        status: Option<LeadStatus>,
        page: PageRequest,
    ) -> Result<Page<LeadRecord>, LeadRepositoryError>;

    /// Move a lead to `status`. Returns `None` when no such lead exists.
    async fn update_status(
        &self,
        kind: LeadKind,
        id: Uuid,
        status: LeadStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<LeadRecord>, LeadRepositoryError>;

    /// Non-zero counts grouped by kind and status.
    async fn count_by_status(&self) -> Result<Vec<LeadStatusCount>, LeadRepositoryError>;
}
