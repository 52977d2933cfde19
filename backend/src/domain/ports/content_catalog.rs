//! Driving port for public content and its administration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Article, ArticleKind, ArticleSummary, Error, NewArticle, Page, PageRequest, Slug,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    /// Published articles of one kind, newest first.
    async fn list_published(
        &self,
        kind: ArticleKind,
        page: PageRequest,
    ) -> Result<Page<ArticleSummary>, Error>;

    /// A single published article, or `not_found`.
    async fn published(&self, kind: ArticleKind, slug: &Slug) -> Result<Article, Error>;

    /// Create an article. A duplicate slug within the kind is a `conflict`.
    async fn create(&self, article: NewArticle) -> Result<Article, Error>;

    /// Publish or withdraw an article.
    async fn set_published(&self, id: Uuid, published: bool) -> Result<Article, Error>;
}
