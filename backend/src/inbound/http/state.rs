//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the driving ports and stay testable without I/O.

use std::sync::Arc;

use mockable::Clock;
use sha2::{Digest, Sha256};

use crate::domain::ports::{
    Accounts, ArticleRepository, ContentCatalog, LeadDesk, LeadIntake, LeadRepository,
    ReferCodeSource, ReferralQuery, SubscriberRepository, Subscriptions, UserRepository,
};
use crate::domain::{
    AccountService, AdminAllowList, ContentService, LeadService, ReferralService,
    SubscriptionService,
};

/// Default location the admin pages redirect anonymous visitors to.
pub const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";

/// Parameter object bundling every driving port used by the handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn Accounts>,
    pub referrals: Arc<dyn ReferralQuery>,
    pub intake: Arc<dyn LeadIntake>,
    pub desk: Arc<dyn LeadDesk>,
    pub subscriptions: Arc<dyn Subscriptions>,
    pub content: Arc<dyn ContentCatalog>,
}

/// Driven adapters the services are built on.
pub struct Repositories<U, L, S, A> {
    pub users: Arc<U>,
    pub leads: Arc<L>,
    pub subscribers: Arc<S>,
    pub articles: Arc<A>,
}

impl HttpStatePorts {
    /// Wire the domain services over one set of repositories.
    pub fn from_repositories<U, L, S, A>(
        repos: Repositories<U, L, S, A>,
        admins: Arc<AdminAllowList>,
        codes: Arc<dyn ReferCodeSource>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        U: UserRepository + 'static,
        L: LeadRepository + 'static,
        S: SubscriberRepository + 'static,
        A: ArticleRepository + 'static,
    {
        let Repositories {
            users,
            leads,
            subscribers,
            articles,
        } = repos;
        let lead_service = Arc::new(LeadService::new(leads, clock.clone()));
        Self {
            accounts: Arc::new(AccountService::new(
                users.clone(),
                admins,
                codes,
                clock.clone(),
            )),
            referrals: Arc::new(ReferralService::new(users)),
            intake: lead_service.clone(),
            desk: lead_service,
            subscriptions: Arc::new(SubscriptionService::new(subscribers, clock.clone())),
            content: Arc::new(ContentService::new(articles, clock)),
        }
    }
}

/// Sign-in and back-office access settings.
#[derive(Clone)]
pub struct AuthSettings {
    sign_in_secret_digest: Option<[u8; 32]>,
    sign_in_path: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            sign_in_secret_digest: None,
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_owned(),
        }
    }
}

impl AuthSettings {
    /// Require callers of the sign-in endpoint to present `secret`.
    ///
    /// Only the digest is kept in memory.
    #[must_use]
    pub fn with_sign_in_secret(mut self, secret: &str) -> Self {
        self.sign_in_secret_digest = Some(Sha256::digest(secret.as_bytes()).into());
        self
    }

    /// Redirect target for anonymous visitors to the admin pages.
    #[must_use]
    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    /// Where anonymous admin-page visitors are redirected.
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// Whether a presented secret satisfies the configured requirement.
    ///
    /// Digests of equal length are compared so the check does not leak the
    /// secret's length. With no secret configured every caller passes; the
    /// server configuration only allows that in debug builds.
    pub fn accepts_sign_in_secret(&self, presented: Option<&str>) -> bool {
        let Some(expected) = self.sign_in_secret_digest else {
            return true;
        };
        let Some(presented) = presented else {
            return false;
        };
        let actual: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        actual
            .iter()
            .zip(expected.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn Accounts>,
    pub referrals: Arc<dyn ReferralQuery>,
    pub intake: Arc<dyn LeadIntake>,
    pub desk: Arc<dyn LeadDesk>,
    pub subscriptions: Arc<dyn Subscriptions>,
    pub content: Arc<dyn ContentCatalog>,
    pub auth: AuthSettings,
}

impl HttpState {
    /// Construct state from the ports bundle and access settings.
    pub fn new(ports: HttpStatePorts, auth: AuthSettings) -> Self {
        let HttpStatePorts {
            accounts,
            referrals,
            intake,
            desk,
            subscriptions,
            content,
        } = ports;
        Self {
            accounts,
            referrals,
            intake,
            desk,
            subscriptions,
            content,
            auth,
        }
    }
}
