//! Lead intake forms: loans, insurance quotes, callbacks, and friend referrals.
//!
//! Each form arrives as a draft of optional raw values. `validate` turns a
//! draft into a typed submission or reports every bad field at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::choice::choice_enum;
use super::contact::{City, EmailAddress, Note, Pan, PersonName, PhoneNumber, Slug, non_blank};
use super::user::ReferCode;
use super::validation::{FieldError, ViolationCode, Violations};

/// Largest loan amount accepted, in rupees.
pub const MAX_LOAN_AMOUNT: i64 = 1_000_000_000;
/// Largest sum insured accepted, in rupees.
pub const MAX_SUM_INSURED: i64 = 1_000_000_000;
pub const MIN_INSURED_AGE: i64 = 18;
pub const MAX_INSURED_AGE: i64 = 100;
/// Upper bound for the free-text preferred callback window.
pub const PREFERRED_TIME_MAX: usize = 80;

choice_enum! {
    /// Lead table a submission belongs to.
    pub enum LeadKind {
        Loan => "loan",
        Insurance => "insurance",
        Callback => "callback",
        Referral => "referral",
    }
}

impl LeadKind {
    /// Plural path segment used by the admin routes.
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Loan => "loans",
            Self::Insurance => "insurance",
            Self::Callback => "callbacks",
            Self::Referral => "referrals",
        }
    }

    /// Parse an admin path segment.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.path_segment() == segment)
    }

    /// Heading used by the back-office pages.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Loan => "Loan applications",
            Self::Insurance => "Insurance quote requests",
            Self::Callback => "Callback requests",
            Self::Referral => "Friend referrals",
        }
    }
}

choice_enum! {
    /// Back-office workflow state of a lead.
    pub enum LeadStatus {
        New => "new",
        Contacted => "contacted",
        Qualified => "qualified",
        Converted => "converted",
        Rejected => "rejected",
    }
}

choice_enum! {
    pub enum LoanType {
        Home => "home",
        Personal => "personal",
        Business => "business",
        LoanAgainstProperty => "loan_against_property",
        Car => "car",
        Education => "education",
        Gold => "gold",
    }
}

choice_enum! {
    pub enum EmploymentType {
        Salaried => "salaried",
        SelfEmployed => "self_employed",
        BusinessOwner => "business_owner",
        Other => "other",
    }
}

choice_enum! {
    pub enum InsuranceType {
        Health => "health",
        Life => "life",
        Term => "term",
        Motor => "motor",
        Travel => "travel",
        Home => "home",
    }
}

choice_enum! {
    /// Product a referred friend is interested in.
    pub enum ReferralProduct {
        Loan => "loan",
        Insurance => "insurance",
        Investment => "investment",
    }
}

fn amount_within(raw: i64, min: i64, max: i64) -> Result<i64, FieldError> {
    if (min..=max).contains(&raw) {
        Ok(raw)
    } else {
        Err(FieldError::new(
            ViolationCode::OutOfRange,
            format!("must be between {min} and {max}"),
        ))
    }
}

fn free_text(raw: String) -> Result<Note, FieldError> {
    Note::new(raw)
}

/// Raw loan application form.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplicationDraft {
    #[schema(example = "home")]
    pub loan_type: Option<String>,
    #[schema(example = "Asha Rao")]
    pub full_name: Option<String>,
    #[schema(example = "asha@example.in")]
    pub email: Option<String>,
    #[schema(example = "+91 98765 43210")]
    pub phone: Option<String>,
    #[schema(example = "ABCDE1234F")]
    pub pan: Option<String>,
    #[schema(example = "Pune")]
    pub city: Option<String>,
    #[schema(example = 2500000)]
    pub amount_requested: Option<i64>,
    pub monthly_income: Option<i64>,
    #[schema(example = "salaried")]
    pub employment_type: Option<String>,
    pub message: Option<String>,
}

/// Validated loan application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub loan_type: LoanType,
    #[schema(value_type = String)]
    pub full_name: PersonName,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    #[schema(value_type = String)]
    pub phone: PhoneNumber,
    #[schema(value_type = String)]
    pub pan: Pan,
    #[schema(value_type = String)]
    pub city: City,
    pub amount_requested: i64,
    pub monthly_income: Option<i64>,
    pub employment_type: EmploymentType,
    #[schema(value_type = Option<String>)]
    pub message: Option<Note>,
}

impl LoanApplication {
    /// Validate every field of a loan application draft.
    pub fn validate(draft: LoanApplicationDraft) -> Result<Self, Violations> {
        let mut v = Violations::default();
        let loan_type = v.required("loanType", non_blank(draft.loan_type), LoanType::parse);
        let full_name = v.required("fullName", non_blank(draft.full_name), PersonName::new);
        let email = v.required("email", non_blank(draft.email), EmailAddress::new);
        let phone = v.required("phone", non_blank(draft.phone), PhoneNumber::new);
        let pan = v.required("pan", non_blank(draft.pan), Pan::new);
        let city = v.required("city", non_blank(draft.city), City::new);
        let amount_requested = v.required("amountRequested", draft.amount_requested, |raw| {
            amount_within(raw, 1, MAX_LOAN_AMOUNT)
        });
        let monthly_income = v.optional("monthlyIncome", draft.monthly_income, |raw| {
            amount_within(raw, 0, MAX_LOAN_AMOUNT)
        });
        let employment_type =
            v.required("employmentType", non_blank(draft.employment_type), EmploymentType::parse);
        let message = v.optional("message", non_blank(draft.message), free_text);

        v.finish(|| {
            Some(Self {
                loan_type: loan_type?,
                full_name: full_name?,
                email: email?,
                phone: phone?,
                pan: pan?,
                city: city?,
                amount_requested: amount_requested?,
                monthly_income: monthly_income?,
                employment_type: employment_type?,
                message: message?,
            })
        })
    }
}

/// Raw insurance quote form.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceQuoteDraft {
    #[schema(example = "term")]
    pub insurance_type: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    #[schema(example = 34)]
    pub age: Option<i64>,
    #[schema(example = 10000000)]
    pub sum_insured: Option<i64>,
    pub message: Option<String>,
}

/// Validated insurance quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceQuoteRequest {
    pub insurance_type: InsuranceType,
    #[schema(value_type = String)]
    pub full_name: PersonName,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    #[schema(value_type = String)]
    pub phone: PhoneNumber,
    #[schema(value_type = String)]
    pub city: City,
    pub age: Option<i16>,
    pub sum_insured: Option<i64>,
    #[schema(value_type = Option<String>)]
    pub message: Option<Note>,
}

impl InsuranceQuoteRequest {
    /// Validate every field of an insurance quote draft.
    pub fn validate(draft: InsuranceQuoteDraft) -> Result<Self, Violations> {
        let mut v = Violations::default();
        let insurance_type = v.required(
            "insuranceType",
            non_blank(draft.insurance_type),
            InsuranceType::parse,
        );
        let full_name = v.required("fullName", non_blank(draft.full_name), PersonName::new);
        let email = v.required("email", non_blank(draft.email), EmailAddress::new);
        let phone = v.required("phone", non_blank(draft.phone), PhoneNumber::new);
        let city = v.required("city", non_blank(draft.city), City::new);
        let age = v.optional("age", draft.age, |raw| {
            amount_within(raw, MIN_INSURED_AGE, MAX_INSURED_AGE)
                .and_then(|age| {
                    i16::try_from(age)
                        .map_err(|_| FieldError::new(ViolationCode::OutOfRange, "is out of range"))
                })
        });
        let sum_insured = v.optional("sumInsured", draft.sum_insured, |raw| {
            amount_within(raw, 1, MAX_SUM_INSURED)
        });
        let message = v.optional("message", non_blank(draft.message), free_text);

        v.finish(|| {
            Some(Self {
                insurance_type: insurance_type?,
                full_name: full_name?,
                email: email?,
                phone: phone?,
                city: city?,
                age: age?,
                sum_insured: sum_insured?,
                message: message?,
            })
        })
    }
}

/// Raw "call me back" form attached to a service page.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallbackDraft {
    #[schema(example = "mutual-funds")]
    pub service: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[schema(example = "Weekdays after 6pm")]
    pub preferred_time: Option<String>,
    pub message: Option<String>,
}

/// Validated callback request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    #[schema(value_type = String)]
    pub service: Slug,
    #[schema(value_type = String)]
    pub full_name: PersonName,
    #[schema(value_type = String)]
    pub phone: PhoneNumber,
    #[schema(value_type = Option<String>)]
    pub email: Option<EmailAddress>,
    #[schema(value_type = Option<String>)]
    pub preferred_time: Option<Note>,
    #[schema(value_type = Option<String>)]
    pub message: Option<Note>,
}

impl CallbackRequest {
    /// Validate every field of a callback draft.
    pub fn validate(draft: CallbackDraft) -> Result<Self, Violations> {
        let mut v = Violations::default();
        let service = v.required("service", non_blank(draft.service), Slug::new);
        let full_name = v.required("fullName", non_blank(draft.full_name), PersonName::new);
        let phone = v.required("phone", non_blank(draft.phone), PhoneNumber::new);
        let email = v.optional("email", non_blank(draft.email), EmailAddress::new);
        let preferred_time = v.optional("preferredTime", non_blank(draft.preferred_time), |raw| {
            Note::bounded(raw, PREFERRED_TIME_MAX)
        });
        let message = v.optional("message", non_blank(draft.message), free_text);

        v.finish(|| {
            Some(Self {
                service: service?,
                full_name: full_name?,
                phone: phone?,
                email: email?,
                preferred_time: preferred_time?,
                message: message?,
            })
        })
    }
}

/// Raw friend referral form submitted by a signed-in user.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralLeadDraft {
    #[schema(example = "insurance")]
    pub product: Option<String>,
    #[schema(example = "Vikram Shah")]
    pub friend_name: Option<String>,
    pub friend_phone: Option<String>,
    pub friend_email: Option<String>,
    pub note: Option<String>,
}

/// Validated friend referral, tagged with the referrer's own code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralLead {
    #[schema(value_type = String)]
    pub referrer_code: ReferCode,
    pub product: ReferralProduct,
    #[schema(value_type = String)]
    pub friend_name: PersonName,
    #[schema(value_type = String)]
    pub friend_phone: PhoneNumber,
    #[schema(value_type = Option<String>)]
    pub friend_email: Option<EmailAddress>,
    #[schema(value_type = Option<String>)]
    pub note: Option<Note>,
}

impl ReferralLead {
    /// Validate a referral draft on behalf of the referrer owning `referrer_code`.
    pub fn validate(
        draft: ReferralLeadDraft,
        referrer_code: ReferCode,
    ) -> Result<Self, Violations> {
        let mut v = Violations::default();
        let product = v.required("product", non_blank(draft.product), ReferralProduct::parse);
        let friend_name = v.required("friendName", non_blank(draft.friend_name), PersonName::new);
        let friend_phone =
            v.required("friendPhone", non_blank(draft.friend_phone), PhoneNumber::new);
        let friend_email =
            v.optional("friendEmail", non_blank(draft.friend_email), EmailAddress::new);
        let note = v.optional("note", non_blank(draft.note), free_text);

        v.finish(|| {
            Some(Self {
                referrer_code,
                product: product?,
                friend_name: friend_name?,
                friend_phone: friend_phone?,
                friend_email: friend_email?,
                note: note?,
            })
        })
    }
}

/// A validated form submission of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeadSubmission {
    Loan(LoanApplication),
    Insurance(InsuranceQuoteRequest),
    Callback(CallbackRequest),
    Referral(ReferralLead),
}

impl LeadSubmission {
    /// Which table the submission belongs to.
    pub const fn kind(&self) -> LeadKind {
        match self {
            Self::Loan(_) => LeadKind::Loan,
            Self::Insurance(_) => LeadKind::Insurance,
            Self::Callback(_) => LeadKind::Callback,
            Self::Referral(_) => LeadKind::Referral,
        }
    }

    /// Name of the person the lead is about.
    pub fn contact_name(&self) -> &str {
        match self {
            Self::Loan(lead) => lead.full_name.as_str(),
            Self::Insurance(lead) => lead.full_name.as_str(),
            Self::Callback(lead) => lead.full_name.as_str(),
            Self::Referral(lead) => lead.friend_name.as_str(),
        }
    }

    /// Phone number of the person the lead is about.
    pub fn contact_phone(&self) -> &str {
        match self {
            Self::Loan(lead) => lead.phone.as_str(),
            Self::Insurance(lead) => lead.phone.as_str(),
            Self::Callback(lead) => lead.phone.as_str(),
            Self::Referral(lead) => lead.friend_phone.as_str(),
        }
    }

    /// Short product description for listings.
    pub fn product_label(&self) -> &str {
        match self {
            Self::Loan(lead) => lead.loan_type.as_str(),
            Self::Insurance(lead) => lead.insurance_type.as_str(),
            Self::Callback(lead) => lead.service.as_str(),
            Self::Referral(lead) => lead.product.as_str(),
        }
    }
}

/// A stored lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: Uuid,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub submission: LeadSubmission,
}

impl LeadRecord {
    /// A freshly received lead in the `new` state.
    pub fn received(id: Uuid, submission: LeadSubmission, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
            submission,
        }
    }

    pub const fn kind(&self) -> LeadKind {
        self.submission.kind()
    }

    /// Acknowledgement returned to the submitter.
    pub fn receipt(&self) -> LeadReceipt {
        LeadReceipt {
            id: self.id,
            kind: self.kind(),
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Acknowledgement returned after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadReceipt {
    pub id: Uuid,
    pub kind: LeadKind,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

/// Number of leads of one kind in one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadStatusCount {
    pub kind: LeadKind,
    pub status: LeadStatus,
    pub count: u64,
}
