//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Referral counts are derived on read from `users.referrer_code`; nothing
//! is denormalised.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    DisplayName, EmailAddress, Page, PageRequest, RefereeSummary, ReferCode, Role, User, UserId,
    UserListing,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::diesel_helpers::{collect_rows, count_to_total, limit_offset};
use super::models::{NewUserRow, RefereeRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const REFER_CODE_CONSTRAINT: &str = "users_refer_code_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Translate unique violations on insert into the matching duplicate error.
fn map_insert_error(error: DieselError, user: &User) -> UserPersistenceError {
    match unique_violation_constraint(&error) {
        Some(EMAIL_CONSTRAINT) => UserPersistenceError::duplicate_email(user.email.as_str()),
        Some(REFER_CODE_CONSTRAINT) => {
            UserPersistenceError::duplicate_refer_code(user.refer_code.as_str())
        }
        _ => map_diesel_error(error),
    }
}

fn into_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row.into_domain().map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(into_user)
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(into_user)
            .transpose()
    }

    async fn find_by_refer_code(
        &self,
        code: &ReferCode,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::refer_code.eq(code.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(into_user)
            .transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&NewUserRow::from_domain(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_insert_error(error, user))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        display_name: &DisplayName,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::display_name.eq(display_name.as_str()),
                users::role.eq(role.as_str()),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(into_user)
            .transpose()
    }

    async fn referees(
        &self,
        code: &ReferCode,
    ) -> Result<Vec<RefereeSummary>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RefereeRow> = users::table
            .filter(users::referrer_code.eq(code.as_str()))
            .select((users::display_name, users::created_at))
            .order_by((users::created_at.asc(), users::display_name.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(RefereeSummary::from).collect())
    }

    async fn list_with_referee_counts(
        &self,
        page: PageRequest,
    ) -> Result<Page<UserListing>, UserPersistenceError> {
        let (limit, offset) = limit_offset(page).map_err(UserPersistenceError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by((users::created_at.desc(), users::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let codes: Vec<&str> = rows.iter().map(|row| row.refer_code.as_str()).collect();
        let counts: HashMap<String, i64> = users::table
            .filter(users::referrer_code.eq_any(&codes))
            .group_by(users::referrer_code)
            .select((users::referrer_code, count_star()))
            .load::<(Option<String>, i64)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .filter_map(|(code, count)| code.map(|code| (code, count)))
            .collect();

        let listings = collect_rows(
            rows.into_iter().map(|row| {
                let referee_count = counts.get(&row.refer_code).copied().unwrap_or(0);
                row.into_domain().map(|user| UserListing {
                    user,
                    referee_count: count_to_total(referee_count),
                })
            }),
            UserPersistenceError::query,
        )?;
        Ok(Page::new(listings, page, count_to_total(total)))
    }
}
