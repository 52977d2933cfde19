//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by the outbound adapters.
//! Driving ports (`Accounts`, `ReferralQuery`, `LeadIntake`, `LeadDesk`,
//! `Subscriptions`, `ContentCatalog`) are implemented by the domain services
//! and consumed by the HTTP layer.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod article_repository;
mod content_catalog;
mod lead_intake;
mod lead_repository;
mod refer_code_source;
mod referral_query;
mod subscriber_repository;
mod subscriptions;
mod user_repository;

#[cfg(test)]
pub use accounts::MockAccounts;
pub use accounts::{Accounts, SignInDraft, SignInRequest};
#[cfg(test)]
pub use article_repository::MockArticleRepository;
pub use article_repository::{ArticleRepository, ArticleRepositoryError};
#[cfg(test)]
pub use content_catalog::MockContentCatalog;
pub use content_catalog::ContentCatalog;
pub use lead_intake::{LeadDesk, LeadIntake};
#[cfg(test)]
pub use lead_intake::{MockLeadDesk, MockLeadIntake};
#[cfg(test)]
pub use lead_repository::MockLeadRepository;
pub use lead_repository::{LeadRepository, LeadRepositoryError};
pub use refer_code_source::{RandomReferCodes, ReferCodeSource};
#[cfg(test)]
pub use referral_query::MockReferralQuery;
pub use referral_query::ReferralQuery;
#[cfg(test)]
pub use subscriber_repository::MockSubscriberRepository;
pub use subscriber_repository::{SubscriberRepository, SubscriberRepositoryError};
#[cfg(test)]
pub use subscriptions::MockSubscriptions;
pub use subscriptions::Subscriptions;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
