//! Driving ports for lead submission and back-office triage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Error, LeadKind, LeadReceipt, LeadRecord, LeadStatus, LeadStatusCount, LeadSubmission, Page,
    PageRequest,
};

/// Public form submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadIntake: Send + Sync {
    /// Store a validated submission as a `new` lead.
    async fn submit(&self, submission: LeadSubmission) -> Result<LeadReceipt, Error>;
}

/// Back-office lead management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadDesk: Send + Sync {
    async fn list(
        &self,
        kind: LeadKind,
        status: Option<LeadStatus>,
        page: PageRequest,
    ) -> Result<Page<LeadRecord>, Error>;

    /// Move a lead through the workflow. Unknown ids are `not_found`.
    async fn update_status(
        &self,
        kind: LeadKind,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<LeadRecord, Error>;

    /// Counts for the dashboard.
    async fn status_counts(&self) -> Result<Vec<LeadStatusCount>, Error>;
}
