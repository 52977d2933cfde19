//! Driven port for newsletter subscribers.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    EmailAddress, Page, PageRequest, SubscribeOutcome, Subscriber, SubscriberStatus, Subscription,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by subscriber repository adapters.
    pub enum SubscriberRepositoryError {
        Connection { message: String } => "subscriber repository connection failed: {message}",
        Query { message: String } => "subscriber repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Insert `subscription` under `id`, or re-activate the existing row with
    /// the same email and refresh its name and source.
    async fn upsert(
        &self,
        id: Uuid,
        subscription: &Subscription,
        now: DateTime<Utc>,
    ) -> Result<SubscribeOutcome, SubscriberRepositoryError>;

    /// Change the status of the subscriber with `email`.
    async fn set_status(
        &self,
        email: &EmailAddress,
        status: SubscriberStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError>;

    /// Newest subscribers first, optionally filtered by status.
    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> Result<Page<Subscriber>, SubscriberRepositoryError>;
}
