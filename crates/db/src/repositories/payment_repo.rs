//! Repository for queued and completed payments, and the PostgreSQL
//! implementation of the payment manager's store.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use scholar_core::error::CoreError;
use scholar_core::payment::{CompletedPayment, QueuedPayment, QueuedPaymentStore};
use scholar_core::types::DbId;

use crate::models::payment::{CompletedPaymentRow, QueuedPaymentRow};

/// Column list for `queued_payments` queries.
const QUEUED_COLUMNS: &str = "\
    queued_payment_id AS id, date_created, date_modified, expiry_date, payment_data";

/// Column list for `completed_payments` queries.
const COMPLETED_COLUMNS: &str = "\
    completed_payment_id AS id, timestamp, payment_type, context_id, user_id, assoc_id, \
    amount, currency_code_alpha, payment_method_plugin_name";

/// Maximum page size for completed payment listings.
const MAX_LIMIT: i64 = 500;

/// Provides storage for payments waiting to be fulfilled.
pub struct QueuedPaymentRepo;

impl QueuedPaymentRepo {
    /// Store a queued payment and return its id.
    pub async fn insert(
        pool: &PgPool,
        payment: &QueuedPayment,
        expiry_date: Option<NaiveDate>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO queued_payments (expiry_date, payment_data) VALUES ($1, $2) \
             RETURNING queued_payment_id",
        )
        .bind(expiry_date)
        .bind(Json(payment))
        .fetch_one(pool)
        .await
    }

    /// Find a queued payment by ID, with its id filled in.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<QueuedPayment>, sqlx::Error> {
        let query = format!("SELECT {QUEUED_COLUMNS} FROM queued_payments WHERE queued_payment_id = $1");
        let row = sqlx::query_as::<_, QueuedPaymentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(QueuedPaymentRow::into_queued_payment))
    }

    /// Replace the stored payment data.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        payment: &QueuedPayment,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queued_payments SET payment_data = $2, date_modified = NOW() \
             WHERE queued_payment_id = $1",
        )
        .bind(id)
        .bind(Json(payment))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM queued_payments WHERE queued_payment_id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete queued payments whose expiry date is in the past.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM queued_payments WHERE expiry_date IS NOT NULL AND expiry_date < CURRENT_DATE",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Provides storage for the completed payment ledger.
pub struct CompletedPaymentRepo;

impl CompletedPaymentRepo {
    async fn insert_on(
        conn: &mut PgConnection,
        completed: &CompletedPayment,
    ) -> Result<DbId, sqlx::Error> {
        let p = &completed.payment;
        sqlx::query_scalar(
            "INSERT INTO completed_payments \
                (timestamp, payment_type, context_id, user_id, assoc_id, amount, \
                 currency_code_alpha, payment_method_plugin_name) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING completed_payment_id",
        )
        .bind(completed.timestamp)
        .bind(p.payment_type)
        .bind(p.context_id)
        .bind(p.user_id)
        .bind(p.assoc_id)
        .bind(p.amount)
        .bind(&p.currency_code)
        .bind(&completed.pay_method_plugin_name)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn insert(pool: &PgPool, completed: &CompletedPayment) -> Result<DbId, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert_on(&mut conn, completed).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CompletedPayment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMPLETED_COLUMNS} FROM completed_payments WHERE completed_payment_id = $1"
        );
        let row = sqlx::query_as::<_, CompletedPaymentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Completed payments of a journal, newest first.
    pub async fn list_by_context(
        pool: &PgPool,
        context_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CompletedPayment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMPLETED_COLUMNS} FROM completed_payments \
             WHERE context_id = $1 \
             ORDER BY timestamp DESC, completed_payment_id DESC \
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, CompletedPaymentRow>(&query)
            .bind(context_id)
            .bind(limit.clamp(1, MAX_LIMIT))
            .bind(offset.max(0))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Move a queued payment to the ledger in one transaction.
    ///
    /// Returns `None` (and records nothing) if the queued payment is gone.
    pub async fn complete_queued(
        pool: &PgPool,
        queued_id: DbId,
        completed: &CompletedPayment,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed: Option<DbId> = sqlx::query_scalar(
            "DELETE FROM queued_payments WHERE queued_payment_id = $1 RETURNING queued_payment_id",
        )
        .bind(queued_id)
        .fetch_optional(&mut *tx)
        .await?;
        if removed.is_none() {
            return Ok(None);
        }

        let completed_id = Self::insert_on(&mut tx, completed).await?;
        tx.commit().await?;
        Ok(Some(completed_id))
    }
}

/// [`QueuedPaymentStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn internal(e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("Payment storage failed: {e}"))
}

#[async_trait]
impl QueuedPaymentStore for PgPaymentStore {
    async fn insert_queued(
        &self,
        payment: &QueuedPayment,
        expiry_date: Option<NaiveDate>,
    ) -> Result<DbId, CoreError> {
        QueuedPaymentRepo::insert(&self.pool, payment, expiry_date)
            .await
            .map_err(internal)
    }

    async fn find_queued(&self, id: DbId) -> Result<Option<QueuedPayment>, CoreError> {
        QueuedPaymentRepo::find_by_id(&self.pool, id)
            .await
            .map_err(internal)
    }

    async fn delete_expired(&self) -> Result<u64, CoreError> {
        QueuedPaymentRepo::delete_expired(&self.pool)
            .await
            .map_err(internal)
    }

    async fn complete(
        &self,
        queued_id: DbId,
        completed: &CompletedPayment,
    ) -> Result<Option<DbId>, CoreError> {
        CompletedPaymentRepo::complete_queued(&self.pool, queued_id, completed)
            .await
            .map_err(internal)
    }
}
