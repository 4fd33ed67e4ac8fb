//! The hosting context (a journal) as seen by domain logic.

use serde::Serialize;

use crate::types::DbId;

/// A journal hosted on the site.
///
/// Loaded by the database layer from `journals` + `journal_settings`; domain
/// code only reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Context {
    pub id: DbId,
    /// URL path segment, unique across the site.
    pub path: String,
    pub primary_locale: String,
    pub supported_form_locales: Vec<String>,
    pub enabled: bool,
    /// Localized journal name, primary locale.
    pub name: Option<String>,
    pub payments_enabled: bool,
    pub currency: Option<String>,
}

impl Context {
    /// Name to display, falling back to the path.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }
}
