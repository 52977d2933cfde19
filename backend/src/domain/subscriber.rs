//! Newsletter subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::choice::choice_enum;
use super::contact::{EmailAddress, PersonName, Slug, non_blank};
use super::validation::Violations;

choice_enum! {
    pub enum SubscriberStatus {
        Active => "active",
        Unsubscribed => "unsubscribed",
    }
}

/// Raw subscription form.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDraft {
    #[schema(example = "priya@example.in")]
    pub email: Option<String>,
    pub name: Option<String>,
    /// Slug of the page the form was shown on.
    #[schema(example = "footer")]
    pub source: Option<String>,
}

/// Validated subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub email: EmailAddress,
    pub name: Option<PersonName>,
    pub source: Option<Slug>,
}

impl Subscription {
    pub fn validate(draft: SubscriptionDraft) -> Result<Self, Violations> {
        let mut v = Violations::default();
        let email = v.required("email", non_blank(draft.email), EmailAddress::new);
        let name = v.optional("name", non_blank(draft.name), PersonName::new);
        let source = v.optional("source", non_blank(draft.source), Slug::new);
        v.finish(|| {
            Some(Self {
                email: email?,
                name: name?,
                source: source?,
            })
        })
    }
}

/// Body of the unsubscribe request.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UnsubscribeDraft {
    pub email: Option<String>,
}

impl UnsubscribeDraft {
    pub fn validate(self) -> Result<EmailAddress, Violations> {
        let mut v = Violations::default();
        let email = v.required("email", non_blank(self.email), EmailAddress::new);
        v.finish(|| email)
    }
}

/// A stored subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    #[schema(value_type = Option<String>)]
    pub name: Option<PersonName>,
    #[schema(value_type = Option<String>)]
    pub source: Option<Slug>,
    pub status: SubscriberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a subscribe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// A new row was inserted.
    Created(Subscriber),
    /// An existing row was refreshed and re-activated.
    Reactivated(Subscriber),
}

impl SubscribeOutcome {
    pub fn subscriber(&self) -> &Subscriber {
        match self {
            Self::Created(subscriber) | Self::Reactivated(subscriber) => subscriber,
        }
    }

    pub fn into_subscriber(self) -> Subscriber {
        match self {
            Self::Created(subscriber) | Self::Reactivated(subscriber) => subscriber,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}
