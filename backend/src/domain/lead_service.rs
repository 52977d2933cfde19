//! Lead intake and triage over a [`LeadRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{LeadDesk, LeadIntake, LeadRepository, LeadRepositoryError};
use crate::domain::{
    Error, LeadKind, LeadReceipt, LeadRecord, LeadStatus, LeadStatusCount, LeadSubmission, Page,
    PageRequest,
};

fn map_lead_error(error: LeadRepositoryError) -> Error {
    match error {
        LeadRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("lead repository unavailable: {message}"))
        }
        LeadRepositoryError::Query { message } => {
            Error::internal(format!("lead repository error: {message}"))
        }
    }
}

/// Implements both lead ports.
#[derive(Clone)]
pub struct LeadService<R> {
    leads: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> LeadService<R> {
    /// Create the service; `clock` stamps submissions and status changes.
    pub fn new(leads: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { leads, clock }
    }
}

#[async_trait]
impl<R> LeadIntake for LeadService<R>
where
    R: LeadRepository,
{
    async fn submit(&self, submission: LeadSubmission) -> Result<LeadReceipt, Error> {
        let record = LeadRecord::received(Uuid::new_v4(), submission, self.clock.utc());
        self.leads.insert(&record).await.map_err(map_lead_error)?;
        info!(lead_id = %record.id, kind = record.kind().as_str(), "lead received");
        Ok(record.receipt())
    }
}

#[async_trait]
impl<R> LeadDesk for LeadService<R>
where
    R: LeadRepository,
{
    async fn list(
        &self,
        kind: LeadKind,
        status: Option<LeadStatus>,
        page: PageRequest,
    ) -> Result<Page<LeadRecord>, Error> {
        self.leads
            .list(kind, status, page)
            .await
            .map_err(map_lead_error)
    }

    async fn update_status(
        &self,
        kind: LeadKind,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<LeadRecord, Error> {
        let updated = self
            .leads
            .update_status(kind, id, status, self.clock.utc())
            .await
            .map_err(map_lead_error)?
            .ok_or_else(|| Error::not_found(format!("no {} lead with id {id}", kind.as_str())))?;
        info!(lead_id = %id, kind = kind.as_str(), status = status.as_str(), "lead status changed");
        Ok(updated)
    }

    async fn status_counts(&self) -> Result<Vec<LeadStatusCount>, Error> {
        self.leads.count_by_status().await.map_err(map_lead_error)
    }
}
