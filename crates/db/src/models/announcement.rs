//! Announcement and announcement-type models and DTOs.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use scholar_core::types::DbId;

use crate::models::settings::LocalizedSettings;

/// Localized announcement settings.
pub const ANNOUNCEMENT_SETTINGS: &[&str] = &["title", "descriptionShort", "description"];

/// Localized announcement-type setting.
pub const ANNOUNCEMENT_TYPE_NAME: &str = "name";

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `announcement_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnnouncementType {
    pub id: DbId,
    pub assoc_type: i16,
    pub assoc_id: DbId,
}

/// A row from the `announcements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Announcement {
    pub id: DbId,
    pub assoc_type: Option<i16>,
    pub assoc_id: DbId,
    pub type_id: Option<DbId>,
    pub date_expire: Option<NaiveDate>,
    pub date_posted: NaiveDateTime,
}

/// An announcement type with its localized names.
#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementTypeWithSettings {
    #[serde(flatten)]
    pub announcement_type: AnnouncementType,
    pub settings: LocalizedSettings,
}

/// An announcement with its localized title and descriptions.
#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementWithSettings {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub settings: LocalizedSettings,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Locale -> text.
pub type LocalizedText = BTreeMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnnouncementType {
    pub assoc_type: i16,
    pub assoc_id: DbId,
    pub name: LocalizedText,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnnouncement {
    pub assoc_type: Option<i16>,
    pub assoc_id: DbId,
    pub type_id: Option<DbId>,
    pub date_expire: Option<NaiveDate>,
    pub title: LocalizedText,
    #[serde(default)]
    pub description_short: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
}

/// Patch for an announcement. Absent fields are left unchanged; given
/// localized fields replace the stored values of the listed locales.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAnnouncement {
    pub type_id: Option<DbId>,
    pub date_expire: Option<NaiveDate>,
    pub title: Option<LocalizedText>,
    pub description_short: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
}

impl CreateAnnouncement {
    /// `(setting_name, values)` pairs to store.
    pub fn settings(&self) -> [(&'static str, &LocalizedText); 3] {
        [
            ("title", &self.title),
            ("descriptionShort", &self.description_short),
            ("description", &self.description),
        ]
    }
}

impl UpdateAnnouncement {
    pub fn settings(&self) -> Vec<(&'static str, &LocalizedText)> {
        [
            ("title", self.title.as_ref()),
            ("descriptionShort", self.description_short.as_ref()),
            ("description", self.description.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, values)| values.map(|v| (name, v)))
        .collect()
    }
}
