//! Queued and completed payment rows.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use scholar_core::payment::{CompletedPayment, Payment, QueuedPayment};
use scholar_core::types::{DbId, Timestamp};

/// A row from the `queued_payments` table.
#[derive(Debug, Clone, FromRow)]
pub struct QueuedPaymentRow {
    pub id: DbId,
    pub date_created: Timestamp,
    pub date_modified: Timestamp,
    pub expiry_date: Option<NaiveDate>,
    pub payment_data: Json<QueuedPayment>,
}

impl QueuedPaymentRow {
    /// The stored payment with its id set from the row.
    pub fn into_queued_payment(self) -> QueuedPayment {
        let mut queued = self.payment_data.0;
        queued.payment.id = Some(self.id);
        queued
    }
}

/// A row from the `completed_payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompletedPaymentRow {
    pub id: DbId,
    pub timestamp: Timestamp,
    pub payment_type: i32,
    pub context_id: DbId,
    pub user_id: Option<DbId>,
    pub assoc_id: Option<DbId>,
    pub amount: f64,
    pub currency_code_alpha: Option<String>,
    pub payment_method_plugin_name: Option<String>,
}

impl From<CompletedPaymentRow> for CompletedPayment {
    fn from(row: CompletedPaymentRow) -> Self {
        Self {
            payment: Payment {
                id: Some(row.id),
                context_id: row.context_id,
                payment_type: row.payment_type,
                amount: row.amount,
                currency_code: row.currency_code_alpha.unwrap_or_default(),
                user_id: row.user_id,
                assoc_id: row.assoc_id,
            },
            timestamp: row.timestamp,
            pay_method_plugin_name: row.payment_method_plugin_name,
        }
    }
}
