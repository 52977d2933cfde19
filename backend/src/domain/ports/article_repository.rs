//! Driven port for articles.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Article, ArticleKind, ArticleSummary, Page, PageRequest, Slug};

use super::define_port_error;

define_port_error! {
    /// Errors raised by article repository adapters.
    pub enum ArticleRepositoryError {
        Connection { message: String } => "article repository connection failed: {message}",
        Query { message: String } => "article repository query failed: {message}",
        /// The kind already has an article with this slug.
        DuplicateSlug { slug: String } => "article slug {slug} already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn insert(&self, article: &Article) -> Result<(), ArticleRepositoryError>;

    /// A published article by kind and slug.
    async fn find_published(
        &self,
        kind: ArticleKind,
        slug: &Slug,
    ) -> Result<Option<Article>, ArticleRepositoryError>;

    /// Published articles of `kind`, most recently published first.
    async fn list_published(
        &self,
        kind: ArticleKind,
        page: PageRequest,
    ) -> Result<Page<ArticleSummary>, ArticleRepositoryError>;

    /// Toggle publication. `published_at` is only written when the article
    /// has never been published.
    async fn set_published(
        &self,
        id: Uuid,
        published: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Article>, ArticleRepositoryError>;
}
