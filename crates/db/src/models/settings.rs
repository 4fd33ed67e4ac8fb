//! Rows of the `*_settings` tables shared by several entities.

use std::collections::BTreeMap;

use sqlx::FromRow;

/// Setting name -> locale -> value. Unlocalized settings use locale `""`.
pub type LocalizedSettings = BTreeMap<String, BTreeMap<String, String>>;

/// One `(locale, setting_name, setting_value)` row.
#[derive(Debug, Clone, FromRow)]
pub struct SettingRow {
    pub owner_id: i64,
    pub locale: String,
    pub setting_name: String,
    pub setting_value: Option<String>,
}

/// Group setting rows by owner id.
pub fn group_by_owner(rows: Vec<SettingRow>) -> BTreeMap<i64, LocalizedSettings> {
    let mut grouped: BTreeMap<i64, LocalizedSettings> = BTreeMap::new();
    for row in rows {
        if let Some(value) = row.setting_value {
            grouped
                .entry(row.owner_id)
                .or_default()
                .entry(row.setting_name)
                .or_default()
                .insert(row.locale, value);
        }
    }
    grouped
}
