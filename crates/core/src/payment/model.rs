//! Payment value objects.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

pub const PAYMENT_TYPE_MEMBERSHIP: i32 = 1;
pub const PAYMENT_TYPE_RENEW_SUBSCRIPTION: i32 = 2;
pub const PAYMENT_TYPE_PURCHASE_ARTICLE: i32 = 3;
pub const PAYMENT_TYPE_DONATION: i32 = 4;
pub const PAYMENT_TYPE_SUBMISSION: i32 = 5;
pub const PAYMENT_TYPE_PUBLICATION: i32 = 7;
pub const PAYMENT_TYPE_PURCHASE_SUBSCRIPTION: i32 = 8;
pub const PAYMENT_TYPE_PURCHASE_ISSUE: i32 = 9;

/// Fields shared by queued and completed payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// `None` until the payment has been stored.
    pub id: Option<DbId>,
    pub context_id: DbId,
    pub payment_type: i32,
    pub amount: f64,
    /// ISO 4217 alpha code, e.g. `"USD"`.
    pub currency_code: String,
    pub user_id: Option<DbId>,
    pub assoc_id: Option<DbId>,
}

impl Payment {
    pub fn new(
        amount: f64,
        currency_code: impl Into<String>,
        user_id: Option<DbId>,
        assoc_id: Option<DbId>,
    ) -> Self {
        Self {
            id: None,
            context_id: 0,
            payment_type: 0,
            amount,
            currency_code: currency_code.into(),
            user_id,
            assoc_id,
        }
    }
}

/// A payment waiting to be fulfilled.
///
/// The whole object is persisted as JSON in `queued_payments.payment_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedPayment {
    #[serde(flatten)]
    pub payment: Payment,
    /// URL the user returns to once the payment is complete.
    pub request_url: Option<String>,
}

impl QueuedPayment {
    pub fn new(
        amount: f64,
        currency_code: impl Into<String>,
        user_id: Option<DbId>,
        assoc_id: Option<DbId>,
    ) -> Self {
        Self {
            payment: Payment::new(amount, currency_code, user_id, assoc_id),
            request_url: None,
        }
    }

    /// Set the request URL, returning the value now stored.
    pub fn set_request_url(&mut self, url: impl Into<String>) -> &str {
        self.request_url.insert(url.into())
    }

    pub fn request_url(&self) -> Option<&str> {
        self.request_url.as_deref()
    }

    pub fn id(&self) -> Option<DbId> {
        self.payment.id
    }
}

/// A payment that has been received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedPayment {
    #[serde(flatten)]
    pub payment: Payment,
    /// Completion time.
    pub timestamp: Timestamp,
    /// Name of the plugin that processed the payment.
    pub pay_method_plugin_name: Option<String>,
}

impl CompletedPayment {
    /// Record a queued payment as completed now.
    pub fn from_queued(queued: &QueuedPayment, plugin_name: Option<&str>) -> Self {
        Self {
            payment: Payment {
                id: None,
                ..queued.payment.clone()
            },
            timestamp: chrono::Utc::now(),
            pay_method_plugin_name: plugin_name.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_request_url_returns_new_value() {
        let mut queued = QueuedPayment::new(10.0, "EUR", Some(3), None);
        assert_eq!(queued.set_request_url("https://example.org/back"), "https://example.org/back");
        assert_eq!(queued.request_url(), Some("https://example.org/back"));
    }

    #[test]
    fn queued_payment_serializes_flat() {
        let mut queued = QueuedPayment::new(25.5, "USD", Some(7), Some(11));
        queued.payment.payment_type = PAYMENT_TYPE_PURCHASE_ARTICLE;
        let json = serde_json::to_value(&queued).unwrap();
        assert_eq!(json["amount"], 25.5);
        assert_eq!(json["currency_code"], "USD");
        assert_eq!(json["payment_type"], 3);
        assert!(json["request_url"].is_null());
    }

    #[test]
    fn completed_from_queued_drops_queue_id() {
        let mut queued = QueuedPayment::new(5.0, "CAD", None, Some(2));
        queued.payment.id = Some(99);
        queued.payment.context_id = 4;
        let completed = CompletedPayment::from_queued(&queued, Some("manual"));
        assert_eq!(completed.payment.id, None);
        assert_eq!(completed.payment.context_id, 4);
        assert_eq!(completed.pay_method_plugin_name.as_deref(), Some("manual"));
    }
}
