//! Payments: value objects, plugins, and the per-context manager.

pub mod manager;
pub mod model;
pub mod plugin;

pub use manager::{CleanupTrigger, OneIn, PaymentManager, QueuedPaymentStore};
pub use model::{CompletedPayment, Payment, QueuedPayment};
pub use plugin::{ManualPaymentPlugin, PaymentPlugin};
