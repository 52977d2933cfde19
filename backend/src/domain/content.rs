//! Public content: news posts, research reports, and downloadable material.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use super::choice::choice_enum;
use super::contact::{Slug, non_blank};
use super::validation::{FieldError, ViolationCode, Violations};

pub const TITLE_MAX: usize = 200;
pub const SUMMARY_MAX: usize = 500;
pub const BODY_MAX: usize = 100_000;

choice_enum! {
    /// Section an article is listed under.
    pub enum ArticleKind {
        News => "news",
        Report => "report",
        Material => "material",
    }
}

fn title(raw: String) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    match FieldError::length(1, TITLE_MAX, trimmed.chars().count()) {
        Some(error) => Err(error),
        None => Ok(trimmed.to_owned()),
    }
}

fn summary(raw: String) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    match FieldError::length(0, SUMMARY_MAX, trimmed.chars().count()) {
        Some(error) => Err(error),
        None => Ok(trimmed.to_owned()),
    }
}

fn body(raw: String) -> Result<String, FieldError> {
    match FieldError::length(0, BODY_MAX, raw.chars().count()) {
        Some(error) => Err(error),
        None => Ok(raw),
    }
}

fn document_url(raw: String) -> Result<Url, FieldError> {
    let invalid = || FieldError::new(ViolationCode::InvalidUrl, "must be an http or https URL");
    let parsed = Url::parse(raw.trim()).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(parsed),
        _ => Err(invalid()),
    }
}

/// Raw article creation form.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    #[schema(example = "report")]
    pub kind: Option<String>,
    #[schema(example = "q3-market-outlook")]
    pub slug: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    #[schema(example = "https://cdn.example.in/reports/q3.pdf")]
    pub document_url: Option<String>,
    pub published: Option<bool>,
}

/// Validated article ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub kind: ArticleKind,
    pub slug: Slug,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub document_url: Option<Url>,
    pub published: bool,
}

impl NewArticle {
    pub fn validate(draft: ArticleDraft) -> Result<Self, Violations> {
        let mut v = Violations::default();
        let kind = v.required("kind", non_blank(draft.kind), ArticleKind::parse);
        let slug = v.required("slug", non_blank(draft.slug), Slug::new);
        let title = v.required("title", non_blank(draft.title), title);
        let summary = v.optional("summary", draft.summary, summary);
        let body = v.optional("body", draft.body, body);
        let document_url = v.optional("documentUrl", non_blank(draft.document_url), document_url);

        v.finish(|| {
            Some(Self {
                kind: kind?,
                slug: slug?,
                title: title?,
                summary: summary?.unwrap_or_default(),
                body: body?.unwrap_or_default(),
                document_url: document_url?,
                published: draft.published.unwrap_or(false),
            })
        })
    }
}

/// Stored article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub kind: ArticleKind,
    #[schema(value_type = String)]
    pub slug: Slug,
    pub title: String,
    pub summary: String,
    pub body: String,
    #[schema(value_type = Option<String>)]
    pub document_url: Option<Url>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Listing view without the body.
    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            id: self.id,
            kind: self.kind,
            slug: self.slug.clone(),
            title: self.title.clone(),
            summary: self.summary.clone(),
            document_url: self.document_url.clone(),
            published_at: self.published_at,
        }
    }
}

/// Article listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: Uuid,
    pub kind: ArticleKind,
    #[schema(value_type = String)]
    pub slug: Slug,
    pub title: String,
    pub summary: String,
    #[schema(value_type = Option<String>)]
    pub document_url: Option<Url>,
    pub published_at: Option<DateTime<Utc>>,
}
