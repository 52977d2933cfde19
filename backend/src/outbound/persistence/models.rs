//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Rows convert into domain types with
//! `into_domain`, which fails when a column holds a value the domain does not
//! recognise (an out-of-band edit).

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use url::Url;
use uuid::Uuid;

use crate::domain::{
    Article, ArticleKind, ArticleSummary, CallbackRequest, City, DisplayName, EmailAddress,
    EmploymentType, FieldError, InsuranceQuoteRequest, InsuranceType, LeadRecord, LeadStatus,
    LeadSubmission, LoanApplication, LoanType, Note, Pan, PersonName, PhoneNumber, RefereeSummary,
    ReferCode, ReferralLead, ReferralProduct, Role, Slug, Subscriber, SubscriberStatus, User,
    UserId,
};

use super::schema::{
    articles, callback_requests, insurance_quote_requests, loan_applications, referral_leads,
    subscribers, users,
};

/// Parse a stored enumerated column, naming the column on failure.
fn stored<'r, T>(
    column: &str,
    raw: &'r str,
    parse: impl FnOnce(&'r str) -> Result<T, FieldError>,
) -> Result<T, String> {
    parse(raw).map_err(|_| format!("unexpected {column} value '{raw}'"))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub refer_code: String,
    pub referrer_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_domain(self) -> Result<User, String> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| format!("unexpected role value '{}'", self.role))?;
        Ok(User {
            id: UserId::from_uuid(self.id),
            email: EmailAddress::from_trusted(self.email),
            display_name: DisplayName::from_trusted(self.display_name),
            role,
            refer_code: ReferCode::from_trusted(self.refer_code),
            referrer_code: self.referrer_code.map(ReferCode::from_trusted),
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub refer_code: &'a str,
    pub referrer_code: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewUserRow<'a> {
    pub fn from_domain(user: &'a User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.as_str(),
            display_name: user.display_name.as_str(),
            role: user.role.as_str(),
            refer_code: user.refer_code.as_str(),
            referrer_code: user.referrer_code.as_ref().map(ReferCode::as_str),
            created_at: user.created_at,
            updated_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct RefereeRow {
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
}

impl From<RefereeRow> for RefereeSummary {
    fn from(row: RefereeRow) -> Self {
        Self {
            display_name: DisplayName::from_trusted(row.display_name),
            joined_at: row.joined_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loan_applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoanApplicationRow {
    pub id: Uuid,
    pub status: String,
    pub loan_type: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub pan: String,
    pub city: String,
    pub amount_requested: i64,
    pub monthly_income: Option<i64>,
    pub employment_type: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanApplicationRow {
    pub fn into_domain(self) -> Result<LeadRecord, String> {
        let lead = LoanApplication {
            loan_type: stored("loan_type", &self.loan_type, LoanType::parse)?,
            full_name: PersonName::from_trusted(self.full_name),
            email: EmailAddress::from_trusted(self.email),
            phone: PhoneNumber::from_trusted(self.phone),
            pan: Pan::from_trusted(self.pan),
            city: City::from_trusted(self.city),
            amount_requested: self.amount_requested,
            monthly_income: self.monthly_income,
            employment_type: stored(
                "employment_type",
                &self.employment_type,
                EmploymentType::parse,
            )?,
            message: self.message.map(Note::from_trusted),
        };
        Ok(LeadRecord {
            id: self.id,
            status: stored("status", &self.status, LeadStatus::parse)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            submission: LeadSubmission::Loan(lead),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loan_applications)]
pub(crate) struct NewLoanApplicationRow<'a> {
    pub id: Uuid,
    pub status: &'a str,
    pub loan_type: &'a str,
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub pan: &'a str,
    pub city: &'a str,
    pub amount_requested: i64,
    pub monthly_income: Option<i64>,
    pub employment_type: &'a str,
    pub message: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = insurance_quote_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InsuranceQuoteRow {
    pub id: Uuid,
    pub status: String,
    pub insurance_type: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub age: Option<i16>,
    pub sum_insured: Option<i64>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsuranceQuoteRow {
    pub fn into_domain(self) -> Result<LeadRecord, String> {
        let lead = InsuranceQuoteRequest {
            insurance_type: stored("insurance_type", &self.insurance_type, InsuranceType::parse)?,
            full_name: PersonName::from_trusted(self.full_name),
            email: EmailAddress::from_trusted(self.email),
            phone: PhoneNumber::from_trusted(self.phone),
            city: City::from_trusted(self.city),
            age: self.age,
            sum_insured: self.sum_insured,
            message: self.message.map(Note::from_trusted),
        };
        Ok(LeadRecord {
            id: self.id,
            status: stored("status", &self.status, LeadStatus::parse)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            submission: LeadSubmission::Insurance(lead),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = insurance_quote_requests)]
pub(crate) struct NewInsuranceQuoteRow<'a> {
    pub id: Uuid,
    pub status: &'a str,
    pub insurance_type: &'a str,
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub city: &'a str,
    pub age: Option<i16>,
    pub sum_insured: Option<i64>,
    pub message: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = callback_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CallbackRow {
    pub id: Uuid,
    pub status: String,
    pub service: String,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub preferred_time: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CallbackRow {
    pub fn into_domain(self) -> Result<LeadRecord, String> {
        let lead = CallbackRequest {
            service: Slug::from_trusted(self.service),
            full_name: PersonName::from_trusted(self.full_name),
            phone: PhoneNumber::from_trusted(self.phone),
            email: self.email.map(EmailAddress::from_trusted),
            preferred_time: self.preferred_time.map(Note::from_trusted),
            message: self.message.map(Note::from_trusted),
        };
        Ok(LeadRecord {
            id: self.id,
            status: stored("status", &self.status, LeadStatus::parse)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            submission: LeadSubmission::Callback(lead),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = callback_requests)]
pub(crate) struct NewCallbackRow<'a> {
    pub id: Uuid,
    pub status: &'a str,
    pub service: &'a str,
    pub full_name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
    pub preferred_time: Option<&'a str>,
    pub message: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = referral_leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReferralLeadRow {
    pub id: Uuid,
    pub status: String,
    pub referrer_code: String,
    pub product: String,
    pub friend_name: String,
    pub friend_phone: String,
    pub friend_email: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReferralLeadRow {
    pub fn into_domain(self) -> Result<LeadRecord, String> {
        let lead = ReferralLead {
            referrer_code: ReferCode::from_trusted(self.referrer_code),
            product: stored("product", &self.product, ReferralProduct::parse)?,
            friend_name: PersonName::from_trusted(self.friend_name),
            friend_phone: PhoneNumber::from_trusted(self.friend_phone),
            friend_email: self.friend_email.map(EmailAddress::from_trusted),
            note: self.note.map(Note::from_trusted),
        };
        Ok(LeadRecord {
            id: self.id,
            status: stored("status", &self.status, LeadStatus::parse)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            submission: LeadSubmission::Referral(lead),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = referral_leads)]
pub(crate) struct NewReferralLeadRow<'a> {
    pub id: Uuid,
    pub status: &'a str,
    pub referrer_code: &'a str,
    pub product: &'a str,
    pub friend_name: &'a str,
    pub friend_phone: &'a str,
    pub friend_email: Option<&'a str>,
    pub note: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subscribers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriberRow {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriberRow {
    pub fn into_domain(self) -> Result<Subscriber, String> {
        Ok(Subscriber {
            id: self.id,
            email: EmailAddress::from_trusted(self.email),
            name: self.name.map(PersonName::from_trusted),
            source: self.source.map(Slug::from_trusted),
            status: stored("status", &self.status, SubscriberStatus::parse)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscribers)]
pub(crate) struct NewSubscriberRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub source: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArticleRow {
    pub id: Uuid,
    pub kind: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub document_url: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

fn stored_url(raw: Option<String>) -> Result<Option<Url>, String> {
    raw.map(|url| Url::parse(&url).map_err(|err| format!("unexpected document_url '{url}': {err}")))
        .transpose()
}

impl ArticleRow {
    pub fn into_domain(self) -> Result<Article, String> {
        Ok(Article {
            id: self.id,
            kind: stored("kind", &self.kind, ArticleKind::parse)?,
            slug: Slug::from_trusted(self.slug),
            title: self.title,
            summary: self.summary,
            body: self.body,
            document_url: stored_url(self.document_url)?,
            published: self.published,
            published_at: self.published_at,
            created_at: self.created_at,
        })
    }
}

/// Listing columns; the body is never loaded for lists.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArticleSummaryRow {
    pub id: Uuid,
    pub kind: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub document_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ArticleSummaryRow {
    pub fn into_domain(self) -> Result<ArticleSummary, String> {
        Ok(ArticleSummary {
            id: self.id,
            kind: stored("kind", &self.kind, ArticleKind::parse)?,
            slug: Slug::from_trusted(self.slug),
            title: self.title,
            summary: self.summary,
            document_url: stored_url(self.document_url)?,
            published_at: self.published_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = articles)]
pub(crate) struct NewArticleRow<'a> {
    pub id: Uuid,
    pub kind: &'a str,
    pub slug: &'a str,
    pub title: &'a str,
    pub summary: &'a str,
    pub body: &'a str,
    pub document_url: Option<&'a str>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewArticleRow<'a> {
    pub fn from_domain(article: &'a Article) -> Self {
        Self {
            id: article.id,
            kind: article.kind.as_str(),
            slug: article.slug.as_str(),
            title: &article.title,
            summary: &article.summary,
            body: &article.body,
            document_url: article.document_url.as_ref().map(Url::as_str),
            published: article.published,
            published_at: article.published_at,
            created_at: article.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user_row(role: &str) -> UserRow {
        UserRow {
            id: Uuid::nil(),
            email: "asha@example.in".to_owned(),
            display_name: "Asha Rao".to_owned(),
            role: role.to_owned(),
            refer_code: "K7QM2XPA".to_owned(),
            referrer_code: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[rstest]
    fn known_role_converts() {
        let user = user_row("admin").into_domain().expect("valid row");
        assert!(user.is_admin());
        assert_eq!(user.refer_code.as_str(), "K7QM2XPA");
    }

    #[rstest]
    fn unknown_role_is_reported() {
        let error = user_row("owner").into_domain().expect_err("corrupt row");
        assert!(error.contains("owner"));
    }

    #[rstest]
    #[case("new", true)]
    #[case("archived", false)]
    fn lead_status_column_is_checked(#[case] status: &str, #[case] ok: bool) {
        let row = CallbackRow {
            id: Uuid::nil(),
            status: status.to_owned(),
            service: "home-loans".to_owned(),
            full_name: "Asha Rao".to_owned(),
            phone: "9876543210".to_owned(),
            email: None,
            preferred_time: None,
            message: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        assert_eq!(row.into_domain().is_ok(), ok);
    }
}
