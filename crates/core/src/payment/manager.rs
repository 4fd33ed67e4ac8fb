//! Queue, fetch and fulfil payments for one context.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::{CompletedPayment, QueuedPayment};
use super::plugin::{ConfigurationForm, PaymentForm, PaymentPlugin};
use crate::context::Context;
use crate::error::CoreError;
use crate::types::DbId;

/// Expired payments are purged on roughly one queue operation in a hundred.
pub const DEFAULT_CLEANUP_ODDS: u32 = 100;

/// Persistence for queued payments.
#[async_trait]
pub trait QueuedPaymentStore: Send + Sync {
    /// Store a new queued payment and return its id.
    async fn insert_queued(
        &self,
        payment: &QueuedPayment,
        expiry_date: Option<NaiveDate>,
    ) -> Result<DbId, CoreError>;

    async fn find_queued(&self, id: DbId) -> Result<Option<QueuedPayment>, CoreError>;

    /// Delete every queued payment whose expiry date has passed.
    async fn delete_expired(&self) -> Result<u64, CoreError>;

    /// Record `completed` and remove the queued row in one step.
    ///
    /// Returns `None` if the queued payment no longer exists.
    async fn complete(
        &self,
        queued_id: DbId,
        completed: &CompletedPayment,
    ) -> Result<Option<DbId>, CoreError>;
}

/// Decides whether a queue operation also purges expired payments.
pub trait CleanupTrigger: Send + Sync {
    fn should_cleanup(&self) -> bool;
}

/// Fires with probability `1 / odds`. `odds == 0` never fires.
#[derive(Debug, Clone, Copy)]
pub struct OneIn(pub u32);

impl CleanupTrigger for OneIn {
    fn should_cleanup(&self) -> bool {
        match self.0 {
            0 => false,
            1 => true,
            n => rand::random_ratio(1, n),
        }
    }
}

/// Payment operations bound to one context and its payment plugin.
pub struct PaymentManager<S> {
    context: Context,
    plugin: Option<Arc<dyn PaymentPlugin>>,
    store: S,
    cleanup: Box<dyn CleanupTrigger>,
}

impl<S: QueuedPaymentStore> PaymentManager<S> {
    pub fn new(context: Context, plugin: Option<Arc<dyn PaymentPlugin>>, store: S) -> Self {
        Self {
            context,
            plugin,
            store,
            cleanup: Box::new(OneIn(DEFAULT_CLEANUP_ODDS)),
        }
    }

    /// Replace the cleanup trigger.
    pub fn with_cleanup_trigger(mut self, trigger: impl CleanupTrigger + 'static) -> Self {
        self.cleanup = Box::new(trigger);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The configured plugin, if any, regardless of whether it is usable.
    pub fn payment_plugin(&self) -> Option<&dyn PaymentPlugin> {
        self.plugin.as_deref()
    }

    /// Whether there is a plugin and it is configured for this context.
    pub fn is_configured(&self) -> bool {
        self.plugin
            .as_ref()
            .is_some_and(|plugin| plugin.is_configured(&self.context))
    }

    fn configured_plugin(&self) -> Option<&dyn PaymentPlugin> {
        self.plugin
            .as_deref()
            .filter(|plugin| plugin.is_configured(&self.context))
    }

    /// Queue a payment for receipt.
    ///
    /// Returns `None` when payments are not configured. Occasionally purges
    /// expired queued payments as a side effect.
    pub async fn queue_payment(
        &self,
        queued: &QueuedPayment,
        expiry_date: Option<NaiveDate>,
    ) -> Result<Option<DbId>, CoreError> {
        if !self.is_configured() {
            tracing::debug!(context_id = self.context.id, "Payment not queued: no configured plugin");
            return Ok(None);
        }

        let id = self.store.insert_queued(queued, expiry_date).await?;
        tracing::info!(context_id = self.context.id, queued_payment_id = id, "Payment queued");

        // The payment is already stored; a failed purge must not hide its id.
        if self.cleanup.should_cleanup() {
            match self.store.delete_expired().await {
                Ok(purged) => tracing::debug!(purged, "Expired queued payments purged"),
                Err(e) => tracing::warn!(error = %e, "Failed to purge expired queued payments"),
            }
        }

        Ok(Some(id))
    }

    pub async fn queued_payment(&self, id: DbId) -> Result<Option<QueuedPayment>, CoreError> {
        self.store.find_queued(id).await
    }

    /// The plugin's payment form for `queued`, when configured.
    pub fn payment_form(&self, queued: &QueuedPayment) -> Option<PaymentForm> {
        self.configured_plugin()
            .map(|plugin| plugin.payment_form(&self.context, queued))
    }

    /// The plugin's settings form, when configured.
    pub fn display_configuration_form(&self) -> Option<ConfigurationForm> {
        self.configured_plugin().map(|plugin| plugin.configuration_form())
    }

    /// Mark a queued payment as received through `plugin_name`.
    ///
    /// Returns `false` if the payment was never stored or was already
    /// fulfilled.
    pub async fn fulfill_queued_payment(
        &self,
        queued: &QueuedPayment,
        plugin_name: Option<&str>,
    ) -> Result<bool, CoreError> {
        let Some(queued_id) = queued.id() else {
            return Ok(false);
        };
        let completed = CompletedPayment::from_queued(queued, plugin_name);

        match self.store.complete(queued_id, &completed).await? {
            Some(completed_id) => {
                tracing::info!(queued_id, completed_id, "Queued payment fulfilled");
                Ok(true)
            }
            None => {
                tracing::warn!(queued_id, "Queued payment already fulfilled or missing");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::payment::plugin::ManualPaymentPlugin;

    #[derive(Default)]
    struct MemoryStore {
        next_id: AtomicU64,
        queued: Mutex<HashMap<DbId, (QueuedPayment, Option<NaiveDate>)>>,
        completed: Mutex<Vec<CompletedPayment>>,
        cleanups: AtomicU64,
    }

    #[async_trait]
    impl QueuedPaymentStore for MemoryStore {
        async fn insert_queued(
            &self,
            payment: &QueuedPayment,
            expiry_date: Option<NaiveDate>,
        ) -> Result<DbId, CoreError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as DbId + 1;
            let mut stored = payment.clone();
            stored.payment.id = Some(id);
            self.queued.lock().unwrap().insert(id, (stored, expiry_date));
            Ok(id)
        }

        async fn find_queued(&self, id: DbId) -> Result<Option<QueuedPayment>, CoreError> {
            Ok(self.queued.lock().unwrap().get(&id).map(|(p, _)| p.clone()))
        }

        async fn delete_expired(&self) -> Result<u64, CoreError> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            let today = chrono::Utc::now().date_naive();
            let mut queued = self.queued.lock().unwrap();
            let before = queued.len();
            queued.retain(|_, (_, expiry)| expiry.map_or(true, |d| d >= today));
            Ok((before - queued.len()) as u64)
        }

        async fn complete(
            &self,
            queued_id: DbId,
            completed: &CompletedPayment,
        ) -> Result<Option<DbId>, CoreError> {
            if self.queued.lock().unwrap().remove(&queued_id).is_none() {
                return Ok(None);
            }
            let mut done = self.completed.lock().unwrap();
            done.push(completed.clone());
            Ok(Some(done.len() as DbId))
        }
    }

    struct Never;
    impl CleanupTrigger for Never {
        fn should_cleanup(&self) -> bool {
            false
        }
    }

    fn context(payments_enabled: bool) -> Context {
        Context {
            id: 1,
            path: "jcs".into(),
            primary_locale: "en".into(),
            supported_form_locales: vec!["en".into()],
            enabled: true,
            name: Some("Journal of Computing".into()),
            payments_enabled,
            currency: Some("USD".into()),
        }
    }

    fn manager(payments_enabled: bool, instructions: &str) -> PaymentManager<MemoryStore> {
        let plugin: Arc<dyn PaymentPlugin> = Arc::new(ManualPaymentPlugin::new(instructions));
        PaymentManager::new(context(payments_enabled), Some(plugin), MemoryStore::default())
            .with_cleanup_trigger(Never)
    }

    #[tokio::test]
    async fn queue_fails_without_plugin() {
        let mgr = PaymentManager::new(context(true), None, MemoryStore::default());
        assert!(!mgr.is_configured());
        let queued = QueuedPayment::new(10.0, "USD", Some(1), None);
        assert_eq!(mgr.queue_payment(&queued, None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn queue_fails_when_plugin_not_configured() {
        let mgr = manager(true, "   ");
        let queued = QueuedPayment::new(10.0, "USD", Some(1), None);
        assert_eq!(mgr.queue_payment(&queued, None).await.unwrap(), None);
        assert!(mgr.payment_form(&queued).is_none());
        assert!(mgr.display_configuration_form().is_none());
    }

    #[tokio::test]
    async fn queue_and_fetch() {
        let mgr = manager(true, "Send a cheque");
        let mut queued = QueuedPayment::new(42.0, "USD", Some(5), Some(9));
        queued.set_request_url("https://example.org/article/9");

        let id = mgr.queue_payment(&queued, None).await.unwrap().unwrap();
        let fetched = mgr.queued_payment(id).await.unwrap().unwrap();
        assert_eq!(fetched.payment.amount, 42.0);
        assert_eq!(fetched.request_url(), Some("https://example.org/article/9"));

        let form = mgr.payment_form(&fetched).unwrap();
        assert_eq!(form.instructions, "Send a cheque");
        assert_eq!(form.queued_payment_id, Some(id));
    }

    #[tokio::test]
    async fn cleanup_runs_when_triggered() {
        let mgr = manager(true, "Pay by wire").with_cleanup_trigger(OneIn(1));
        let yesterday = chrono::Utc::now().date_naive() - chrono::Duration::days(1);
        let expired = QueuedPayment::new(1.0, "USD", None, None);

        // Every queue call purges, so the expired payment is gone at once.
        let first = mgr.queue_payment(&expired, Some(yesterday)).await.unwrap().unwrap();
        let second = mgr
            .queue_payment(&QueuedPayment::new(2.0, "USD", None, None), None)
            .await
            .unwrap()
            .unwrap();

        assert!(mgr.queued_payment(first).await.unwrap().is_none());
        assert!(mgr.queued_payment(second).await.unwrap().is_some());
        assert_eq!(mgr.store.cleanups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_odds_never_fire() {
        assert!(!OneIn(0).should_cleanup());
        assert!(OneIn(1).should_cleanup());
    }

    #[tokio::test]
    async fn fulfill_moves_payment_to_completed() {
        let mgr = manager(true, "Pay at the desk");
        let id = mgr
            .queue_payment(&QueuedPayment::new(15.0, "EUR", Some(2), None), None)
            .await
            .unwrap()
            .unwrap();
        let queued = mgr.queued_payment(id).await.unwrap().unwrap();

        let plugin = Some(ManualPaymentPlugin::NAME);
        assert!(mgr.fulfill_queued_payment(&queued, plugin).await.unwrap());
        assert!(!mgr.fulfill_queued_payment(&queued, plugin).await.unwrap());

        let completed = mgr.store.completed.lock().unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(
            completed[0].pay_method_plugin_name.as_deref(),
            Some(ManualPaymentPlugin::NAME)
        );
    }

    #[tokio::test]
    async fn fulfill_unstored_payment_is_false() {
        let mgr = manager(true, "Pay at the desk");
        let queued = QueuedPayment::new(15.0, "EUR", Some(2), None);
        assert!(!mgr.fulfill_queued_payment(&queued, None).await.unwrap());
    }

    struct FailingCleanupStore(MemoryStore);

    #[async_trait]
    impl QueuedPaymentStore for FailingCleanupStore {
        async fn insert_queued(
            &self,
            payment: &QueuedPayment,
            expiry_date: Option<NaiveDate>,
        ) -> Result<DbId, CoreError> {
            self.0.insert_queued(payment, expiry_date).await
        }

        async fn find_queued(&self, id: DbId) -> Result<Option<QueuedPayment>, CoreError> {
            self.0.find_queued(id).await
        }

        async fn delete_expired(&self) -> Result<u64, CoreError> {
            Err(CoreError::Internal("connection reset".into()))
        }

        async fn complete(
            &self,
            queued_id: DbId,
            completed: &CompletedPayment,
        ) -> Result<Option<DbId>, CoreError> {
            self.0.complete(queued_id, completed).await
        }
    }

    #[tokio::test]
    async fn failed_cleanup_still_returns_the_queued_id() {
        let plugin: Arc<dyn PaymentPlugin> = Arc::new(ManualPaymentPlugin::new("Pay by wire"));
        let mgr = PaymentManager::new(
            context(true),
            Some(plugin),
            FailingCleanupStore(MemoryStore::default()),
        )
        .with_cleanup_trigger(OneIn(1));

        let queued = QueuedPayment::new(12.0, "USD", Some(4), None);
        let id = mgr.queue_payment(&queued, None).await.unwrap().unwrap();
        assert!(mgr.queued_payment(id).await.unwrap().is_some());
        assert_eq!(mgr.store.0.queued.lock().unwrap().len(), 1);
    }
}
