//! PostgreSQL-backed `ArticleRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::{Nullable, Timestamptz};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ArticleRepository, ArticleRepositoryError};
use crate::domain::{Article, ArticleKind, ArticleSummary, Page, PageRequest, Slug};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::diesel_helpers::{collect_rows, count_to_total, limit_offset};
use super::models::{ArticleRow, ArticleSummaryRow, NewArticleRow};
use super::pool::{DbPool, PoolError};
use super::schema::articles;

const KIND_SLUG_CONSTRAINT: &str = "articles_kind_slug_key";

diesel::define_sql_function! {
    fn coalesce(
        first: Nullable<Timestamptz>,
        second: Nullable<Timestamptz>,
    ) -> Nullable<Timestamptz>;
}

/// Diesel-backed implementation of the `ArticleRepository` port.
#[derive(Clone)]
pub struct DieselArticleRepository {
    pool: DbPool,
}

impl DieselArticleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ArticleRepositoryError {
    map_basic_pool_error(error, ArticleRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> ArticleRepositoryError {
    map_basic_diesel_error(
        error,
        ArticleRepositoryError::query,
        ArticleRepositoryError::connection,
    )
}

fn into_article(row: ArticleRow) -> Result<Article, ArticleRepositoryError> {
    row.into_domain().map_err(ArticleRepositoryError::query)
}

#[async_trait]
impl ArticleRepository for DieselArticleRepository {
    async fn insert(&self, article: &Article) -> Result<(), ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(articles::table)
            .values(&NewArticleRow::from_domain(article))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| match unique_violation_constraint(&error) {
                Some(KIND_SLUG_CONSTRAINT) => {
                    ArticleRepositoryError::duplicate_slug(article.slug.as_str())
                }
                _ => map_diesel_error(error),
            })
    }

    async fn find_published(
        &self,
        kind: ArticleKind,
        slug: &Slug,
    ) -> Result<Option<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        articles::table
            .filter(articles::kind.eq(kind.as_str()))
            .filter(articles::slug.eq(slug.as_str()))
            .filter(articles::published.eq(true))
            .select(ArticleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(into_article)
            .transpose()
    }

    async fn list_published(
        &self,
        kind: ArticleKind,
        page: PageRequest,
    ) -> Result<Page<ArticleSummary>, ArticleRepositoryError> {
        let (limit, offset) = limit_offset(page).map_err(ArticleRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let visible = || {
            articles::kind
                .eq(kind.as_str())
                .and(articles::published.eq(true))
        };

        let total: i64 = articles::table
            .filter(visible())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ArticleSummaryRow> = articles::table
            .filter(visible())
            .select(ArticleSummaryRow::as_select())
            .order_by((articles::published_at.desc(), articles::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = collect_rows(
            rows.into_iter().map(ArticleSummaryRow::into_domain),
            ArticleRepositoryError::query,
        )?;
        Ok(Page::new(items, page, count_to_total(total)))
    }

    async fn set_published(
        &self,
        id: Uuid,
        published: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = articles::table.find(id);
        let row: QueryResult<ArticleRow> = if published {
            diesel::update(target)
                .set((
                    articles::published.eq(true),
                    articles::published_at.eq(coalesce(articles::published_at, Some(now))),
                ))
                .returning(ArticleRow::as_returning())
                .get_result(&mut conn)
                .await
        } else {
            diesel::update(target)
                .set(articles::published.eq(false))
                .returning(ArticleRow::as_returning())
                .get_result(&mut conn)
                .await
        };
        row.optional()
            .map_err(map_diesel_error)?
            .map(into_article)
            .transpose()
    }
}
