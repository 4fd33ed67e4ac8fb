//! Shared access to the `*_settings` tables.
//!
//! Every settings table has the shape `(<owner>, locale, setting_name,
//! setting_value[, setting_type])` with a unique index on
//! `(<owner>, locale, setting_name)`.

use std::collections::BTreeMap;

use sqlx::{PgConnection, PgExecutor};
use scholar_core::types::DbId;

use crate::models::settings::{group_by_owner, LocalizedSettings, SettingRow};

/// A settings table and the column naming its owner.
#[derive(Debug, Clone, Copy)]
pub struct SettingsTable {
    table: &'static str,
    owner_column: &'static str,
    has_type: bool,
}

pub const ANNOUNCEMENT_SETTINGS: SettingsTable = SettingsTable {
    table: "announcement_settings",
    owner_column: "announcement_id",
    has_type: true,
};

pub const ANNOUNCEMENT_TYPE_SETTINGS: SettingsTable = SettingsTable {
    table: "announcement_type_settings",
    owner_column: "type_id",
    has_type: true,
};

pub const JOURNAL_SETTINGS: SettingsTable = SettingsTable {
    table: "journal_settings",
    owner_column: "journal_id",
    has_type: false,
};

pub const NAVIGATION_MENU_ITEM_SETTINGS: SettingsTable = SettingsTable {
    table: "navigation_menu_item_settings",
    owner_column: "navigation_menu_item_id",
    has_type: true,
};

pub const CONTROLLED_VOCAB_ENTRY_SETTINGS: SettingsTable = SettingsTable {
    table: "controlled_vocab_entry_settings",
    owner_column: "controlled_vocab_entry_id",
    has_type: true,
};

impl SettingsTable {
    /// Settings of every owner in `owner_ids`, keyed by owner.
    pub async fn load<'e, E>(
        &self,
        executor: E,
        owner_ids: &[DbId],
    ) -> Result<BTreeMap<DbId, LocalizedSettings>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if owner_ids.is_empty() {
            return Ok(BTreeMap::new());
        }
        let query = format!(
            "SELECT {owner} AS owner_id, locale, setting_name, setting_value \
             FROM {table} WHERE {owner} = ANY($1)",
            owner = self.owner_column,
            table = self.table,
        );
        let rows = sqlx::query_as::<_, SettingRow>(&query)
            .bind(owner_ids)
            .fetch_all(executor)
            .await?;
        Ok(group_by_owner(rows))
    }

    /// Settings of a single owner.
    pub async fn load_one<'e, E>(
        &self,
        executor: E,
        owner_id: DbId,
    ) -> Result<LocalizedSettings, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        Ok(self
            .load(executor, &[owner_id])
            .await?
            .remove(&owner_id)
            .unwrap_or_default())
    }

    /// Store one value per locale of a setting. Empty values delete that
    /// locale's row.
    pub async fn set_localized(
        &self,
        conn: &mut PgConnection,
        owner_id: DbId,
        setting_name: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<(), sqlx::Error> {
        for (locale, value) in values {
            if value.is_empty() {
                self.delete_value(conn, owner_id, setting_name, locale).await?;
            } else {
                self.upsert(conn, owner_id, setting_name, locale, value).await?;
            }
        }
        Ok(())
    }

    /// Store an unlocalized setting (locale `""`).
    pub async fn set_value(
        &self,
        conn: &mut PgConnection,
        owner_id: DbId,
        setting_name: &str,
        value: &str,
    ) -> Result<(), sqlx::Error> {
        self.upsert(conn, owner_id, setting_name, "", value).await
    }

    async fn upsert(
        &self,
        conn: &mut PgConnection,
        owner_id: DbId,
        setting_name: &str,
        locale: &str,
        value: &str,
    ) -> Result<(), sqlx::Error> {
        let query = if self.has_type {
            format!(
                "INSERT INTO {table} ({owner}, locale, setting_name, setting_value, setting_type) \
                 VALUES ($1, $2, $3, $4, 'string') \
                 ON CONFLICT ({owner}, locale, setting_name) \
                 DO UPDATE SET setting_value = EXCLUDED.setting_value",
                owner = self.owner_column,
                table = self.table,
            )
        } else {
            format!(
                "INSERT INTO {table} ({owner}, locale, setting_name, setting_value) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT ({owner}, locale, setting_name) \
                 DO UPDATE SET setting_value = EXCLUDED.setting_value",
                owner = self.owner_column,
                table = self.table,
            )
        };
        sqlx::query(&query)
            .bind(owner_id)
            .bind(locale)
            .bind(setting_name)
            .bind(value)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn delete_value(
        &self,
        conn: &mut PgConnection,
        owner_id: DbId,
        setting_name: &str,
        locale: &str,
    ) -> Result<(), sqlx::Error> {
        let query = format!(
            "DELETE FROM {table} WHERE {owner} = $1 AND setting_name = $2 AND locale = $3",
            owner = self.owner_column,
            table = self.table,
        );
        sqlx::query(&query)
            .bind(owner_id)
            .bind(setting_name)
            .bind(locale)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Delete every setting of an owner.
    pub async fn delete_all(&self, conn: &mut PgConnection, owner_id: DbId) -> Result<(), sqlx::Error> {
        let query = format!(
            "DELETE FROM {table} WHERE {owner} = $1",
            owner = self.owner_column,
            table = self.table,
        );
        sqlx::query(&query).bind(owner_id).execute(&mut *conn).await?;
        Ok(())
    }
}
