//! Site administration page logic.
//!
//! These functions build the data behind each admin page; the HTTP layer
//! decides who may call them and loads what they need from storage.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::context::Context;
use crate::types::DbId;
use crate::version::Version;

/// Operations of the site administration area.
pub const ADMIN_OPERATIONS: &[&str] = &[
    "index",
    "contexts",
    "settings",
    "wizard",
    "system_info",
    "expire_sessions",
    "download_scheduled_task_log_file",
    "clear_scheduled_task_log_files",
];

/// Site settings tabs, in display order.
pub const SITE_SETTINGS_TABS: &[&str] = &[
    "siteSetup",
    "siteAppearance",
    "sitePlugins",
    "siteConfig",
    "siteInfo",
    "languages",
    "navigationMenus",
    "bulkEmails",
    "siteTheme",
    "siteAppearanceSetup",
];

/// Tabs that stay available when the site hosts exactly one context.
pub const SINGLE_CONTEXT_TABS: &[&str] = &["siteSetup", "languages", "bulkEmails"];

/// Tab name -> availability.
///
/// On a single-context site the per-context tabs are managed from the
/// context itself, so only [`SINGLE_CONTEXT_TABS`] remain.
pub fn site_settings_availability(context_count: i64) -> BTreeMap<&'static str, bool> {
    let single_context = context_count == 1;
    SITE_SETTINGS_TABS
        .iter()
        .map(|tab| (*tab, !single_context || SINGLE_CONTEXT_TABS.contains(tab)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Breadcrumb {
    fn new(id: &str, name: &str, url: Option<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url,
        }
    }
}

/// Breadcrumbs for an admin operation.
///
/// Every page except `index` starts with a link back to the admin index.
pub fn breadcrumbs(operation: &str, admin_url: &str) -> Vec<Breadcrumb> {
    if operation == "index" {
        return Vec::new();
    }
    let mut crumbs = vec![Breadcrumb::new(
        "admin",
        "navigation.admin",
        Some(admin_url.to_string()),
    )];
    match operation {
        "contexts" => crumbs.push(Breadcrumb::new("contexts", "admin.hostedContexts", None)),
        "settings" => crumbs.push(Breadcrumb::new("settings", "admin.siteSettings", None)),
        "wizard" => {
            crumbs.push(Breadcrumb::new(
                "contexts",
                "admin.hostedContexts",
                Some(format!("{}/contexts", admin_url.trim_end_matches('/'))),
            ));
            crumbs.push(Breadcrumb::new("wizard", "manager.settings.wizard", None));
        }
        "system_info" => crumbs.push(Breadcrumb::new(
            "systemInfo",
            "admin.systemInformation",
            None,
        )),
        _ => {}
    }
    crumbs
}

/// Parse the context id of the settings wizard.
///
/// Only plain ASCII digits are accepted; anything else is not found.
pub fn parse_wizard_context_id(arg: Option<&str>) -> Option<DbId> {
    let arg = arg?;
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}

/// Shown when the running code is newer than the installed database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeNotice {
    pub new_version_available: bool,
    pub current_version: String,
    pub latest_version: String,
}

/// The upgrade notice, if warnings are enabled and an upgrade is pending.
pub fn upgrade_notice(
    show_upgrade_warning: bool,
    installed: Option<&Version>,
    code: &Version,
) -> Option<UpgradeNotice> {
    if !show_upgrade_warning {
        return None;
    }
    let installed = installed?;
    (code > installed).then(|| UpgradeNotice {
        new_version_available: true,
        current_version: installed.to_string(),
        latest_version: code.to_string(),
    })
}

/// Common fields of every admin page.
#[derive(Debug, Clone, Serialize)]
pub struct AdminPage<T: Serialize> {
    pub page_component: &'static str,
    pub page_title: &'static str,
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<UpgradeNotice>,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> AdminPage<T> {
    pub fn new(operation: &str, admin_url: &str, upgrade: Option<UpgradeNotice>, body: T) -> Self {
        Self {
            page_component: "AdminPage",
            page_title: page_title(operation),
            breadcrumbs: breadcrumbs(operation, admin_url),
            upgrade,
            body,
        }
    }
}

fn page_title(operation: &str) -> &'static str {
    match operation {
        "contexts" => "admin.hostedContexts",
        "settings" => "admin.siteSettings",
        "wizard" => "manager.settings.wizard",
        "system_info" => "admin.systemInformation",
        _ => "admin.siteAdmin",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub id: DbId,
    pub path: String,
    pub name: String,
    pub enabled: bool,
}

impl From<&Context> for ContextSummary {
    fn from(ctx: &Context) -> Self {
        Self {
            id: ctx.id,
            path: ctx.path.clone(),
            name: ctx.display_name().to_string(),
            enabled: ctx.enabled,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsPage {
    pub component_availability: BTreeMap<&'static str, bool>,
    pub supported_locales: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardPage {
    pub edit_context: ContextSummary,
    pub supported_form_locales: Vec<String>,
    pub bulk_emails_enabled: bool,
}

impl WizardPage {
    /// `bulk_email_contexts` lists the contexts allowed to send bulk email.
    pub fn new(ctx: &Context, bulk_email_contexts: &[DbId]) -> Self {
        Self {
            edit_context: ctx.into(),
            supported_form_locales: ctx.supported_form_locales.clone(),
            bulk_emails_enabled: bulk_email_contexts.contains(&ctx.id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionEntry {
    pub version: String,
    pub date_installed: crate::types::Timestamp,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfoPage {
    pub current_version: Option<VersionEntry>,
    pub version_history: Vec<VersionEntry>,
    /// Locale key -> value.
    pub server_info: BTreeMap<&'static str, String>,
    pub config_data: BTreeMap<String, String>,
}

/// Setting-name fragments whose values are never shown.
const SECRET_MARKERS: &[&str] = &["secret", "password", "token", "key", "database_url"];

/// Replace secret configuration values with a mask.
pub fn sanitize_config<I, K, V>(entries: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(k, v)| {
            let key: String = k.into();
            let lower = key.to_ascii_lowercase();
            let value = if SECRET_MARKERS.iter().any(|m| lower.contains(m)) {
                "********".to_string()
            } else {
                v.into()
            };
            (key, value)
        })
        .collect()
}
