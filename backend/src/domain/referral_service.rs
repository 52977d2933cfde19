//! Referral credit derived from the user table.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{ReferralQuery, UserRepository};
use crate::domain::{Error, RefereeSummary, ReferCode, ReferralSummary, User};

/// Implements [`ReferralQuery`] by listing users that carry a referrer code.
#[derive(Clone)]
pub struct ReferralService<R> {
    users: Arc<R>,
}

impl<R> ReferralService<R> {
    /// Answer referral queries from the user store.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R> ReferralQuery for ReferralService<R>
where
    R: UserRepository,
{
    async fn referees(&self, code: &str) -> Result<Vec<RefereeSummary>, Error> {
        let Some(code) = ReferCode::lookup(code) else {
            debug!("blank refer code; no referees");
            return Ok(Vec::new());
        };
        self.users.referees(&code).await.map_err(map_user_error)
    }

    async fn summary_for_code(&self, code: &str) -> Result<ReferralSummary, Error> {
        let referees = self.referees(code).await?;
        Ok(ReferralSummary::new(code.trim(), referees))
    }

    async fn summary(&self, user: &User) -> Result<ReferralSummary, Error> {
        let referees = self
            .users
            .referees(&user.refer_code)
            .await
            .map_err(map_user_error)?;
        Ok(ReferralSummary::for_code(&user.refer_code, referees))
    }
}
