//! Driving port for referral credit.

use async_trait::async_trait;

use crate::domain::{Error, RefereeSummary, ReferralSummary, User};

/// Read-only referral lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferralQuery: Send + Sync {
    /// Users whose referrer code equals `code`. Blank or unknown codes yield
    /// an empty list.
    async fn referees(&self, code: &str) -> Result<Vec<RefereeSummary>, Error>;

    /// Referral credit for any code.
    async fn summary_for_code(&self, code: &str) -> Result<ReferralSummary, Error>;

    /// Referral credit for `user`'s own code.
    async fn summary(&self, user: &User) -> Result<ReferralSummary, Error>;
}
