//! Email allow-list that grants the admin role.

use std::collections::HashSet;

use tracing::warn;

use super::contact::EmailAddress;
use super::user::Role;

/// Normalised emails of back-office staff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList(HashSet<EmailAddress>);

impl AdminAllowList {
    /// Parse a comma-separated list. Invalid entries are skipped with a
    /// warning.
    ///
    /// ```
    /// use finlead::domain::{AdminAllowList, EmailAddress, Role};
    ///
    /// let admins = AdminAllowList::parse("ops@example.in, Head@Example.in,,");
    /// let head = EmailAddress::new("head@example.in").unwrap();
    /// assert_eq!(admins.role_for(&head), Role::Admin);
    /// assert_eq!(admins.len(), 2);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let emails = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| match EmailAddress::new(entry) {
                Ok(email) => Some(email),
                Err(error) => {
                    warn!(entry, %error, "ignoring invalid admin email");
                    None
                }
            })
            .collect();
        Self(emails)
    }

    /// Build the list from already validated addresses.
    pub fn from_emails(emails: impl IntoIterator<Item = EmailAddress>) -> Self {
        Self(emails.into_iter().collect())
    }

    /// Role an account with `email` should hold.
    pub fn role_for(&self, email: &EmailAddress) -> Role {
        if self.0.contains(email) {
            Role::Admin
        } else {
            Role::Member
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
