use std::sync::Arc;

use scholar_core::payment::{ManualPaymentPlugin, PaymentPlugin};

use crate::config::{PaymentPluginKind, ServerConfig};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: scholar_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Payment method used by every journal, if any.
    pub payment_plugin: Option<Arc<dyn PaymentPlugin>>,
}

impl AppState {
    pub fn new(pool: scholar_db::DbPool, config: ServerConfig) -> Self {
        let payment_plugin: Option<Arc<dyn PaymentPlugin>> = match config.payments.plugin {
            PaymentPluginKind::Manual => Some(Arc::new(ManualPaymentPlugin::new(
                config.payments.manual_instructions.clone(),
            ))),
            PaymentPluginKind::None => None,
        };

        Self {
            pool,
            config: Arc::new(config),
            payment_plugin,
        }
    }
}
