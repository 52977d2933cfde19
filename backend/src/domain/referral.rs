//! Referral credit read model.
//!
//! Credit is never stored. It is derived on every read by listing the users
//! whose referrer code equals a given refer code.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::user::{DisplayName, ReferCode};

/// A user who signed up with someone's refer code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefereeSummary {
    #[schema(value_type = String, example = "Vikram Shah")]
    pub display_name: DisplayName,
    pub joined_at: DateTime<Utc>,
}

/// Referral credit for one refer code.
///
/// `referee_count` always equals `referees.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralSummary {
    #[schema(example = "K7QM2XPA")]
    pub refer_code: String,
    pub referee_count: usize,
    pub referees: Vec<RefereeSummary>,
}

impl ReferralSummary {
    /// Build a summary from an ordered referee list.
    ///
    /// ```
    /// use finlead::domain::ReferralSummary;
    ///
    /// let summary = ReferralSummary::new("NOBODY01", Vec::new());
    /// assert_eq!(summary.referee_count, 0);
    /// assert!(summary.referees.is_empty());
    /// ```
    pub fn new(refer_code: impl Into<String>, referees: Vec<RefereeSummary>) -> Self {
        Self {
            refer_code: refer_code.into(),
            referee_count: referees.len(),
            referees,
        }
    }

    /// Summary for a user's own code.
    pub fn for_code(code: &ReferCode, referees: Vec<RefereeSummary>) -> Self {
        Self::new(code.as_str(), referees)
    }
}
