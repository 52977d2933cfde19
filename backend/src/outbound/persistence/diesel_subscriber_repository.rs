//! PostgreSQL-backed `SubscriberRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{SubscriberRepository, SubscriberRepositoryError};
use crate::domain::{
    EmailAddress, Page, PageRequest, SubscribeOutcome, Subscriber, SubscriberStatus, Subscription,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{collect_rows, count_to_total, limit_offset};
use super::models::{NewSubscriberRow, SubscriberRow};
use super::pool::{DbPool, PoolError};
use super::schema::subscribers;

/// Diesel-backed implementation of the `SubscriberRepository` port.
///
/// Subscribing is a single `INSERT ... ON CONFLICT (email) DO UPDATE`, so two
/// concurrent sign-ups with the same address never produce two rows.
#[derive(Clone)]
pub struct DieselSubscriberRepository {
    pool: DbPool,
}

impl DieselSubscriberRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SubscriberRepositoryError {
    map_basic_pool_error(error, SubscriberRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> SubscriberRepositoryError {
    map_basic_diesel_error(
        error,
        SubscriberRepositoryError::query,
        SubscriberRepositoryError::connection,
    )
}

fn into_subscriber(row: SubscriberRow) -> Result<Subscriber, SubscriberRepositoryError> {
    row.into_domain().map_err(SubscriberRepositoryError::query)
}

#[async_trait]
impl SubscriberRepository for DieselSubscriberRepository {
    async fn upsert(
        &self,
        id: Uuid,
        subscription: &Subscription,
        now: DateTime<Utc>,
    ) -> Result<SubscribeOutcome, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSubscriberRow {
            id,
            email: subscription.email.as_str(),
            name: subscription.name.as_ref().map(|name| name.as_str()),
            source: subscription.source.as_ref().map(|source| source.as_str()),
            status: SubscriberStatus::Active.as_str(),
            created_at: now,
            updated_at: now,
        };
        let stored: SubscriberRow = diesel::insert_into(subscribers::table)
            .values(&row)
            .on_conflict(subscribers::email)
            .do_update()
            .set((
                subscribers::name.eq(excluded(subscribers::name)),
                subscribers::source.eq(excluded(subscribers::source)),
                subscribers::status.eq(excluded(subscribers::status)),
                subscribers::updated_at.eq(excluded(subscribers::updated_at)),
            ))
            .returning(SubscriberRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        // The conflicting row keeps its original id.
        let created = stored.id == id;
        let subscriber = into_subscriber(stored)?;
        Ok(if created {
            SubscribeOutcome::Created(subscriber)
        } else {
            SubscribeOutcome::Reactivated(subscriber)
        })
    }

    async fn set_status(
        &self,
        email: &EmailAddress,
        status: SubscriberStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(subscribers::table.filter(subscribers::email.eq(email.as_str())))
            .set((
                subscribers::status.eq(status.as_str()),
                subscribers::updated_at.eq(now),
            ))
            .returning(SubscriberRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(into_subscriber)
            .transpose()
    }

    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> Result<Page<Subscriber>, SubscriberRepositoryError> {
        let (limit, offset) = limit_offset(page).map_err(SubscriberRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut counted = subscribers::table.into_boxed();
        let mut selected = subscribers::table
            .select(SubscriberRow::as_select())
            .into_boxed();
        if let Some(status) = status {
            counted = counted.filter(subscribers::status.eq(status.as_str()));
            selected = selected.filter(subscribers::status.eq(status.as_str()));
        }

        let total: i64 = counted
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<SubscriberRow> = selected
            .order_by((subscribers::created_at.desc(), subscribers::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = collect_rows(
            rows.into_iter().map(SubscriberRow::into_domain),
            SubscriberRepositoryError::query,
        )?;
        Ok(Page::new(items, page, count_to_total(total)))
    }
}
