//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{
    DisplayName, EmailAddress, Page, PageRequest, RefereeSummary, ReferCode, Role, User, UserId,
    UserListing,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this email.
        DuplicateEmail { email: String } => "email {email} is already registered",
        /// Another account already owns this refer code.
        DuplicateReferCode { code: String } => "refer code {code} is already taken",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the owner of a refer code.
    async fn find_by_refer_code(
        &self,
        code: &ReferCode,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new account.
    ///
    /// Unique violations surface as [`UserPersistenceError::DuplicateEmail`]
    /// or [`UserPersistenceError::DuplicateReferCode`].
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Refresh the mutable profile fields. Codes are never touched.
    async fn update_profile(
        &self,
        id: &UserId,
        display_name: &DisplayName,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Users whose referrer code equals `code`, oldest first then by name.
    async fn referees(&self, code: &ReferCode)
    -> Result<Vec<RefereeSummary>, UserPersistenceError>;

    /// Newest users first, each with the number of users they referred.
    async fn list_with_referee_counts(
        &self,
        page: PageRequest,
    ) -> Result<Page<UserListing>, UserPersistenceError>;
}
