//! Account service implementing the [`Accounts`] driving port.
//!
//! First sign-in creates the account with a fresh refer code and, when the
//! supplied referrer code belongs to an existing user, records the referral
//! link. Later sign-ins refresh only the display name and role.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    Accounts, ReferCodeSource, SignInRequest, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AdminAllowList, Error, Page, PageRequest, ReferCode, User, UserId, UserListing,
};

/// Attempts made to find an unused refer code before giving up.
pub const REFER_CODE_ATTEMPTS: usize = 5;

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
        UserPersistenceError::DuplicateReferCode { code } => {
            Error::internal(format!("refer code collision on {code}"))
        }
    }
}

/// Sign-in and account queries backed by a [`UserRepository`].
#[derive(Clone)]
pub struct AccountService<R> {
    users: Arc<R>,
    admins: Arc<AdminAllowList>,
    codes: Arc<dyn ReferCodeSource>,
    clock: Arc<dyn Clock>,
}

impl<R> AccountService<R> {
    pub fn new(
        users: Arc<R>,
        admins: Arc<AdminAllowList>,
        codes: Arc<dyn ReferCodeSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            admins,
            codes,
            clock,
        }
    }
}

impl<R> AccountService<R>
where
    R: UserRepository,
{
    async fn refresh(&self, existing: User, request: &SignInRequest) -> Result<User, Error> {
        let role = self.admins.role_for(&existing.email);
        if existing.display_name == request.display_name && existing.role == role {
            return Ok(existing);
        }
        if existing.role != role {
            info!(user_id = %existing.id, role = role.as_str(), "role changed at sign-in");
        }
        self.users
            .update_profile(&existing.id, &request.display_name, role)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::internal("user vanished during sign-in"))
    }

    async fn resolve_referrer(&self, code: Option<&ReferCode>) -> Result<Option<ReferCode>, Error> {
        let Some(code) = code else {
            return Ok(None);
        };
        let owner = self
            .users
            .find_by_refer_code(code)
            .await
            .map_err(map_user_error)?;
        if owner.is_none() {
            warn!(referrer_code = %code, "dropping unknown referrer code");
        }
        Ok(owner.map(|user| user.refer_code))
    }

    async fn create(&self, request: SignInRequest) -> Result<User, Error> {
        let referrer_code = self
            .resolve_referrer(request.referrer_code.as_ref())
            .await?;
        let role = self.admins.role_for(&request.email);

        for attempt in 1..=REFER_CODE_ATTEMPTS {
            let user = User {
                id: UserId::random(),
                email: request.email.clone(),
                display_name: request.display_name.clone(),
                role,
                refer_code: self.codes.next_code(),
                referrer_code: referrer_code.clone(),
                created_at: self.clock.utc(),
            };
            match self.users.insert(&user).await {
                Ok(()) => {
                    info!(
                        user_id = %user.id,
                        referred = user.referrer_code.is_some(),
                        "account created"
                    );
                    return Ok(user);
                }
                Err(UserPersistenceError::DuplicateReferCode { code }) => {
                    warn!(attempt, %code, "refer code collision; retrying");
                }
                Err(UserPersistenceError::DuplicateEmail { .. }) => {
                    // A concurrent first sign-in for the same email won.
                    let existing = self
                        .users
                        .find_by_email(&request.email)
                        .await
                        .map_err(map_user_error)?
                        .ok_or_else(|| Error::internal("account missing after email conflict"))?;
                    return self.refresh(existing, &request).await;
                }
                Err(other) => return Err(map_user_error(other)),
            }
        }
        Err(Error::internal(format!(
            "no unused refer code after {REFER_CODE_ATTEMPTS} attempts"
        )))
    }
}

#[async_trait]
impl<R> Accounts for AccountService<R>
where
    R: UserRepository,
{
    async fn sign_in(&self, request: SignInRequest) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_email(&request.email)
            .await
            .map_err(map_user_error)?;
        match existing {
            Some(user) => self.refresh(user, &request).await,
            None => self.create(request).await,
        }
    }

    async fn profile(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(id).await.map_err(map_user_error)
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<UserListing>, Error> {
        self.users
            .list_with_referee_counts(page)
            .await
            .map_err(map_user_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
