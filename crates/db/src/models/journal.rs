//! Journals (hosting contexts) and site-wide settings.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use scholar_core::context::Context;
use scholar_core::types::DbId;

use crate::models::settings::LocalizedSettings;

pub const SETTING_NAME: &str = "name";
pub const SETTING_SUPPORTED_FORM_LOCALES: &str = "supportedFormLocales";
pub const SETTING_PAYMENTS_ENABLED: &str = "paymentsEnabled";
pub const SETTING_CURRENCY: &str = "currency";

/// Site setting listing the journals allowed to send bulk email (JSON array of ids).
pub const SITE_SETTING_ENABLE_BULK_EMAILS: &str = "enableBulkEmails";
/// Site setting listing the site's supported locales (JSON array).
pub const SITE_SETTING_SUPPORTED_LOCALES: &str = "supportedLocales";

/// A row from the `journals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Journal {
    pub id: DbId,
    pub path: String,
    pub seq: f64,
    pub primary_locale: String,
    pub enabled: bool,
}

impl Journal {
    /// Build the domain context from the row and its settings.
    pub fn into_context(self, settings: &LocalizedSettings) -> Context {
        let unlocalized = |name: &str| settings.get(name).and_then(|v| v.get("")).cloned();
        let name = settings.get(SETTING_NAME).and_then(|v| {
            v.get(&self.primary_locale)
                .or_else(|| v.values().next())
                .cloned()
        });
        let supported_form_locales = unlocalized(SETTING_SUPPORTED_FORM_LOCALES)
            .and_then(|json| serde_json::from_str::<Vec<String>>(&json).ok())
            .unwrap_or_else(|| vec![self.primary_locale.clone()]);

        Context {
            id: self.id,
            path: self.path,
            primary_locale: self.primary_locale,
            supported_form_locales,
            enabled: self.enabled,
            name,
            payments_enabled: unlocalized(SETTING_PAYMENTS_ENABLED)
                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
            currency: unlocalized(SETTING_CURRENCY),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJournal {
    pub path: String,
    pub primary_locale: String,
    pub name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}
