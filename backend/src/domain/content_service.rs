//! Content catalogue service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{ArticleRepository, ArticleRepositoryError, ContentCatalog};
use crate::domain::{
    Article, ArticleKind, ArticleSummary, Error, NewArticle, Page, PageRequest, Slug,
};

fn map_article_error(error: ArticleRepositoryError) -> Error {
    match error {
        ArticleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("article repository unavailable: {message}"))
        }
        ArticleRepositoryError::Query { message } => {
            Error::internal(format!("article repository error: {message}"))
        }
        ArticleRepositoryError::DuplicateSlug { slug } => {
            Error::conflict(format!("an article with slug {slug} already exists"))
        }
    }
}

/// Published-content lookups plus the admin authoring commands.
#[derive(Clone)]
pub struct ContentService<R> {
    articles: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ContentService<R> {
    /// Create the service; `clock` stamps creation and publication.
    pub fn new(articles: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { articles, clock }
    }
}

#[async_trait]
impl<R> ContentCatalog for ContentService<R>
where
    R: ArticleRepository,
{
    async fn list_published(
        &self,
        kind: ArticleKind,
        page: PageRequest,
    ) -> Result<Page<ArticleSummary>, Error> {
        self.articles
            .list_published(kind, page)
            .await
            .map_err(map_article_error)
    }

    async fn published(&self, kind: ArticleKind, slug: &Slug) -> Result<Article, Error> {
        self.articles
            .find_published(kind, slug)
            .await
            .map_err(map_article_error)?
            .ok_or_else(|| Error::not_found(format!("no published {kind} named {slug}")))
    }

    async fn create(&self, article: NewArticle) -> Result<Article, Error> {
        let now = self.clock.utc();
        let stored = Article {
            id: Uuid::new_v4(),
            kind: article.kind,
            slug: article.slug,
            title: article.title,
            summary: article.summary,
            body: article.body,
            document_url: article.document_url,
            published: article.published,
            published_at: article.published.then_some(now),
            created_at: now,
        };
        self.articles
            .insert(&stored)
            .await
            .map_err(map_article_error)?;
        info!(article_id = %stored.id, kind = stored.kind.as_str(), "article created");
        Ok(stored)
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Article, Error> {
        self.articles
            .set_published(id, published, self.clock.utc())
            .await
            .map_err(map_article_error)?
            .ok_or_else(|| Error::not_found(format!("no article with id {id}")))
    }
}
