//! Driving port for the newsletter.

use async_trait::async_trait;

use crate::domain::{
    EmailAddress, Error, Page, PageRequest, SubscribeOutcome, Subscriber, SubscriberStatus,
    Subscription,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Subscriptions: Send + Sync {
    /// Subscribe, or re-activate an existing subscriber.
    async fn subscribe(&self, subscription: Subscription) -> Result<SubscribeOutcome, Error>;

    /// Unsubscribe by email. Unknown emails are `not_found`.
    async fn unsubscribe(&self, email: &EmailAddress) -> Result<Subscriber, Error>;

    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> Result<Page<Subscriber>, Error>;
}
