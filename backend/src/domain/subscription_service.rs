//! Newsletter subscription service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{SubscriberRepository, SubscriberRepositoryError, Subscriptions};
use crate::domain::{
    EmailAddress, Error, Page, PageRequest, SubscribeOutcome, Subscriber, SubscriberStatus,
    Subscription,
};

fn map_subscriber_error(error: SubscriberRepositoryError) -> Error {
    match error {
        SubscriberRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("subscriber repository unavailable: {message}"))
        }
        SubscriberRepositoryError::Query { message } => {
            Error::internal(format!("subscriber repository error: {message}"))
        }
    }
}

#[derive(Clone)]
pub struct SubscriptionService<R> {
    subscribers: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> SubscriptionService<R> {
    /// Create the service over a subscriber store.
    pub fn new(subscribers: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { subscribers, clock }
    }
}

#[async_trait]
impl<R> Subscriptions for SubscriptionService<R>
where
    R: SubscriberRepository,
{
    async fn subscribe(&self, subscription: Subscription) -> Result<SubscribeOutcome, Error> {
        let outcome = self
            .subscribers
            .upsert(Uuid::new_v4(), &subscription, self.clock.utc())
            .await
            .map_err(map_subscriber_error)?;
        info!(
            subscriber_id = %outcome.subscriber().id,
            created = outcome.is_created(),
            "subscriber active"
        );
        Ok(outcome)
    }

    async fn unsubscribe(&self, email: &EmailAddress) -> Result<Subscriber, Error> {
        self.subscribers
            .set_status(email, SubscriberStatus::Unsubscribed, self.clock.utc())
            .await
            .map_err(map_subscriber_error)?
            .ok_or_else(|| Error::not_found("no subscriber with that email"))
    }

    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> Result<Page<Subscriber>, Error> {
        self.subscribers
            .list(status, page)
            .await
            .map_err(map_subscriber_error)
    }
}
