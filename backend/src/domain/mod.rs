//! Domain primitives, aggregates, ports, and services.
//!
//! Types here are transport agnostic. Inbound adapters validate raw drafts
//! into these types; outbound adapters persist them behind the port traits.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: the error payload every API returns.
//! - [`User`], [`ReferCode`], [`ReferralSummary`]: accounts and referral credit.
//! - [`LeadSubmission`], [`LeadRecord`]: the four intake forms.
//! - [`Subscriber`], [`Article`]: newsletter and public content.
//! - Services implementing the driving ports in [`ports`].

pub(crate) mod choice;

pub mod account_service;
pub mod admin_allow_list;
pub mod contact;
pub mod content;
pub mod content_service;
pub mod error;
pub mod lead_service;
pub mod leads;
pub mod pagination;
pub mod ports;
pub mod referral;
pub mod referral_service;
pub mod subscriber;
pub mod subscription_service;
pub mod trace_id;
pub mod user;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::account_service::{AccountService, REFER_CODE_ATTEMPTS};
pub use self::admin_allow_list::AdminAllowList;
pub use self::contact::{City, EmailAddress, Note, Pan, PersonName, PhoneNumber, Slug};
pub use self::content::{Article, ArticleDraft, ArticleKind, ArticleSummary, NewArticle};
pub use self::content_service::ContentService;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::lead_service::LeadService;
pub use self::leads::{
    CallbackDraft, CallbackRequest, EmploymentType, InsuranceQuoteDraft, InsuranceQuoteRequest,
    InsuranceType, LeadKind, LeadReceipt, LeadRecord, LeadStatus, LeadStatusCount,
    LeadSubmission, LoanApplication, LoanApplicationDraft, LoanType, ReferralLead,
    ReferralLeadDraft, ReferralProduct,
};
pub use self::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
pub use self::referral::{RefereeSummary, ReferralSummary};
pub use self::referral_service::ReferralService;
pub use self::subscriber::{
    SubscribeOutcome, Subscriber, SubscriberStatus, Subscription, SubscriptionDraft,
    UnsubscribeDraft,
};
pub use self::subscription_service::SubscriptionService;
pub use self::trace_id::TraceId;
pub use self::user::{
    DisplayName, REFER_CODE_ALPHABET, REFER_CODE_LEN, ReferCode, Role, User, UserId, UserIdError,
    UserListing,
};
pub use self::validation::{
    FieldError, FieldViolation, VALIDATION_FAILED_MESSAGE, ViolationCode, Violations,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use finlead::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("admin access required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
