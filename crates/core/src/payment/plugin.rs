//! Payment plugins: the delegate that actually collects money.

use serde::Serialize;

use super::model::QueuedPayment;
use crate::context::Context;

/// What a plugin shows a user who is about to pay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentForm {
    pub plugin_name: String,
    pub queued_payment_id: Option<i64>,
    pub amount: f64,
    pub currency_code: String,
    /// Free-form instructions or hand-off details for the user.
    pub instructions: String,
    pub return_url: Option<String>,
}

/// Settings a manager can edit for a plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationForm {
    pub plugin_name: String,
    pub fields: Vec<ConfigurationField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationField {
    pub name: &'static str,
    pub value: String,
}

/// A payment method.
pub trait PaymentPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the plugin has everything it needs for this context.
    fn is_configured(&self, context: &Context) -> bool;

    fn payment_form(&self, context: &Context, queued: &QueuedPayment) -> PaymentForm;

    fn configuration_form(&self) -> ConfigurationForm;
}

/// Offline payment: the user is told how to pay and a manager marks the
/// payment as received.
#[derive(Debug, Clone)]
pub struct ManualPaymentPlugin {
    instructions: String,
}

impl ManualPaymentPlugin {
    pub const NAME: &'static str = "ManualPayment";

    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }
}

impl PaymentPlugin for ManualPaymentPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_configured(&self, context: &Context) -> bool {
        context.payments_enabled && !self.instructions.trim().is_empty()
    }

    fn payment_form(&self, _context: &Context, queued: &QueuedPayment) -> PaymentForm {
        PaymentForm {
            plugin_name: Self::NAME.to_string(),
            queued_payment_id: queued.id(),
            amount: queued.payment.amount,
            currency_code: queued.payment.currency_code.clone(),
            instructions: self.instructions.clone(),
            return_url: queued.request_url.clone(),
        }
    }

    fn configuration_form(&self) -> ConfigurationForm {
        ConfigurationForm {
            plugin_name: Self::NAME.to_string(),
            fields: vec![ConfigurationField {
                name: "manualInstructions",
                value: self.instructions.clone(),
            }],
        }
    }
}
