//! PostgreSQL-backed `LeadRepository` spanning the four lead tables.
//!
//! Each lead kind has its own table with the same `id`, `status`,
//! `created_at` and `updated_at` columns. `lead_table!` generates the
//! per-table queries so the trait methods only pick the right module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{LeadRepository, LeadRepositoryError};
use crate::domain::{
    LeadKind, LeadRecord, LeadStatus, LeadStatusCount, LeadSubmission, Page, PageRequest,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{collect_rows, count_to_total, limit_offset};
use super::models::{
    NewCallbackRow, NewInsuranceQuoteRow, NewLoanApplicationRow, NewReferralLeadRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{callback_requests, insurance_quote_requests, loan_applications, referral_leads};

/// Diesel-backed implementation of the `LeadRepository` port.
#[derive(Clone)]
pub struct DieselLeadRepository {
    pool: DbPool,
}

impl DieselLeadRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LeadRepositoryError {
    map_basic_pool_error(error, LeadRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> LeadRepositoryError {
    map_basic_diesel_error(
        error,
        LeadRepositoryError::query,
        LeadRepositoryError::connection,
    )
}

/// One page of rows plus the total count, shared by every lead table module.
struct Listed {
    total: i64,
    rows: Vec<Result<LeadRecord, String>>,
}

/// Generate list, status update and status count queries for one table.
macro_rules! lead_table {
    ($module:ident, $table:ident, $row:ident) => {
        mod $module {
            use chrono::{DateTime, Utc};
            use diesel::dsl::count_star;
            use diesel::prelude::*;
            use diesel::result::Error as DieselError;
            use diesel_async::{AsyncPgConnection, RunQueryDsl};
            use uuid::Uuid;

            use crate::domain::{LeadRecord, LeadStatus};

            use super::Listed;
            use super::super::models::$row;
            use super::super::schema::$table;

            pub(super) async fn list(
                conn: &mut AsyncPgConnection,
                status: Option<LeadStatus>,
                limit: i64,
                offset: i64,
            ) -> Result<Listed, DieselError> {
                let mut counted = $table::table.into_boxed();
                let mut selected = $table::table.select($row::as_select()).into_boxed();
                if let Some(status) = status {
                    counted = counted.filter($table::status.eq(status.as_str()));
                    selected = selected.filter($table::status.eq(status.as_str()));
                }
                let total: i64 = counted.count().get_result(conn).await?;
                let rows: Vec<$row> = selected
                    .order_by(($table::created_at.desc(), $table::id.desc()))
                    .limit(limit)
                    .offset(offset)
                    .load(conn)
                    .await?;
                Ok(Listed {
                    total,
                    rows: rows.into_iter().map($row::into_domain).collect(),
                })
            }

            pub(super) async fn update_status(
                conn: &mut AsyncPgConnection,
                id: Uuid,
                status: LeadStatus,
                updated_at: DateTime<Utc>,
            ) -> Result<Option<Result<LeadRecord, String>>, DieselError> {
                let row: Option<$row> = diesel::update($table::table.find(id))
                    .set((
                        $table::status.eq(status.as_str()),
                        $table::updated_at.eq(updated_at),
                    ))
                    .returning($row::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                Ok(row.map($row::into_domain))
            }

            pub(super) async fn status_counts(
                conn: &mut AsyncPgConnection,
            ) -> Result<Vec<(String, i64)>, DieselError> {
                $table::table
                    .group_by($table::status)
                    .select(($table::status, count_star()))
                    .load(conn)
                    .await
            }
        }
    };
}

lead_table!(loans, loan_applications, LoanApplicationRow);
lead_table!(insurance, insurance_quote_requests, InsuranceQuoteRow);
lead_table!(callbacks, callback_requests, CallbackRow);
lead_table!(referrals, referral_leads, ReferralLeadRow);

#[async_trait]
impl LeadRepository for DieselLeadRepository {
    async fn insert(&self, record: &LeadRecord) -> Result<(), LeadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let status = record.status.as_str();
        let inserted = match &record.submission {
            LeadSubmission::Loan(lead) => {
                diesel::insert_into(loan_applications::table)
                    .values(&NewLoanApplicationRow {
                        id: record.id,
                        status,
                        loan_type: lead.loan_type.as_str(),
                        full_name: lead.full_name.as_str(),
                        email: lead.email.as_str(),
                        phone: lead.phone.as_str(),
                        pan: lead.pan.as_str(),
                        city: lead.city.as_str(),
                        amount_requested: lead.amount_requested,
                        monthly_income: lead.monthly_income,
                        employment_type: lead.employment_type.as_str(),
                        message: lead.message.as_ref().map(|note| note.as_str()),
                        created_at: record.created_at,
                        updated_at: record.updated_at,
                    })
                    .execute(&mut conn)
                    .await
            }
            LeadSubmission::Insurance(lead) => {
                diesel::insert_into(insurance_quote_requests::table)
                    .values(&NewInsuranceQuoteRow {
                        id: record.id,
                        status,
                        insurance_type: lead.insurance_type.as_str(),
                        full_name: lead.full_name.as_str(),
                        email: lead.email.as_str(),
                        phone: lead.phone.as_str(),
                        city: lead.city.as_str(),
                        age: lead.age,
                        sum_insured: lead.sum_insured,
                        message: lead.message.as_ref().map(|note| note.as_str()),
                        created_at: record.created_at,
                        updated_at: record.updated_at,
                    })
                    .execute(&mut conn)
                    .await
            }
            LeadSubmission::Callback(lead) => {
                diesel::insert_into(callback_requests::table)
                    .values(&NewCallbackRow {
                        id: record.id,
                        status,
                        service: lead.service.as_str(),
                        full_name: lead.full_name.as_str(),
                        phone: lead.phone.as_str(),
                        email: lead.email.as_ref().map(|email| email.as_str()),
                        preferred_time: lead.preferred_time.as_ref().map(|note| note.as_str()),
                        message: lead.message.as_ref().map(|note| note.as_str()),
                        created_at: record.created_at,
                        updated_at: record.updated_at,
                    })
                    .execute(&mut conn)
                    .await
            }
            LeadSubmission::Referral(lead) => {
                diesel::insert_into(referral_leads::table)
                    .values(&NewReferralLeadRow {
                        id: record.id,
                        status,
                        referrer_code: lead.referrer_code.as_str(),
                        product: lead.product.as_str(),
                        friend_name: lead.friend_name.as_str(),
                        friend_phone: lead.friend_phone.as_str(),
                        friend_email: lead.friend_email.as_ref().map(|email| email.as_str()),
                        note: lead.note.as_ref().map(|note| note.as_str()),
                        created_at: record.created_at,
                        updated_at: record.updated_at,
                    })
                    .execute(&mut conn)
                    .await
            }
        };
        inserted.map(|_| ()).map_err(map_diesel_error)
    }

    async fn list(
        &self,
        kind: LeadKind,
        status: Option<LeadStatus>,
        page: PageRequest,
    ) -> Result<Page<LeadRecord>, LeadRepositoryError> {
        let (limit, offset) = limit_offset(page).map_err(LeadRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let listed = match kind {
            LeadKind::Loan => loans::list(&mut conn, status, limit, offset).await,
            LeadKind::Insurance => insurance::list(&mut conn, status, limit, offset).await,
            LeadKind::Callback => callbacks::list(&mut conn, status, limit, offset).await,
            LeadKind::Referral => referrals::list(&mut conn, status, limit, offset).await,
        }
        .map_err(map_diesel_error)?;
        let items = collect_rows(listed.rows.into_iter(), LeadRepositoryError::query)?;
        Ok(Page::new(items, page, count_to_total(listed.total)))
    }

    async fn update_status(
        &self,
        kind: LeadKind,
        id: Uuid,
        status: LeadStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<LeadRecord>, LeadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = match kind {
            LeadKind::Loan => loans::update_status(&mut conn, id, status, updated_at).await,
            LeadKind::Insurance => {
                insurance::update_status(&mut conn, id, status, updated_at).await
            }
            LeadKind::Callback => callbacks::update_status(&mut conn, id, status, updated_at).await,
            LeadKind::Referral => referrals::update_status(&mut conn, id, status, updated_at).await,
        }
        .map_err(map_diesel_error)?;
        updated
            .transpose()
            .map_err(LeadRepositoryError::query)
    }

    async fn count_by_status(&self) -> Result<Vec<LeadStatusCount>, LeadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut counts = Vec::new();
        for &kind in LeadKind::ALL {
            let grouped = match kind {
                LeadKind::Loan => loans::status_counts(&mut conn).await,
                LeadKind::Insurance => insurance::status_counts(&mut conn).await,
                LeadKind::Callback => callbacks::status_counts(&mut conn).await,
                LeadKind::Referral => referrals::status_counts(&mut conn).await,
            }
            .map_err(map_diesel_error)?;
            let mut per_kind = collect_rows(
                grouped.into_iter().map(|(status, count)| {
                    LeadStatus::parse(&status)
                        .map(|status| LeadStatusCount {
                            kind,
                            status,
                            count: count_to_total(count),
                        })
                        .map_err(|_| format!("unexpected status value '{status}'"))
                }),
                LeadRepositoryError::query,
            )?;
            per_kind.sort_by_key(|count| {
                LeadStatus::ALL
                    .iter()
                    .position(|status| *status == count.status)
            });
            counts.extend(per_kind);
        }
        Ok(counts)
    }
}
