//! Repository for journals and site-wide settings.

use std::collections::BTreeMap;

use sqlx::PgPool;
use scholar_core::context::Context;
use scholar_core::types::DbId;

use crate::models::journal::{
    CreateJournal, Journal, SETTING_NAME, SITE_SETTING_ENABLE_BULK_EMAILS,
    SITE_SETTING_SUPPORTED_LOCALES,
};
use crate::repositories::settings::JOURNAL_SETTINGS;

/// Column list for `journals` queries.
const COLUMNS: &str = "journal_id AS id, path, seq, primary_locale, enabled";

/// Loads journals as domain contexts.
pub struct JournalRepo;

impl JournalRepo {
    pub async fn create(pool: &PgPool, input: &CreateJournal) -> Result<Context, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO journals (path, primary_locale, enabled, seq) \
             VALUES ($1, $2, $3, COALESCE((SELECT MAX(seq) FROM journals), 0) + 1) \
             RETURNING {COLUMNS}"
        );
        let journal = sqlx::query_as::<_, Journal>(&query)
            .bind(&input.path)
            .bind(&input.primary_locale)
            .bind(input.enabled.unwrap_or(true))
            .fetch_one(&mut *tx)
            .await?;

        if let Some(name) = &input.name {
            let names = BTreeMap::from([(input.primary_locale.clone(), name.clone())]);
            JOURNAL_SETTINGS
                .set_localized(&mut tx, journal.id, SETTING_NAME, &names)
                .await?;
        }
        let settings = JOURNAL_SETTINGS.load_one(&mut *tx, journal.id).await?;

        tx.commit().await?;
        Ok(journal.into_context(&settings))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Context>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM journals WHERE journal_id = $1");
        let Some(journal) = sqlx::query_as::<_, Journal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        let settings = JOURNAL_SETTINGS.load_one(pool, id).await?;
        Ok(Some(journal.into_context(&settings)))
    }

    pub async fn find_by_path(pool: &PgPool, path: &str) -> Result<Option<Context>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM journals WHERE path = $1");
        let Some(journal) = sqlx::query_as::<_, Journal>(&query)
            .bind(path)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        let settings = JOURNAL_SETTINGS.load_one(pool, journal.id).await?;
        Ok(Some(journal.into_context(&settings)))
    }

    /// Every journal in display order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Context>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM journals ORDER BY seq, journal_id");
        let rows = sqlx::query_as::<_, Journal>(&query).fetch_all(pool).await?;

        let ids: Vec<DbId> = rows.iter().map(|j| j.id).collect();
        let mut settings = JOURNAL_SETTINGS.load(pool, &ids).await?;
        Ok(rows
            .into_iter()
            .map(|j| {
                let s = settings.remove(&j.id).unwrap_or_default();
                j.into_context(&s)
            })
            .collect())
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM journals")
            .fetch_one(pool)
            .await
    }

    /// Store an unlocalized journal setting.
    pub async fn set_setting(
        pool: &PgPool,
        journal_id: DbId,
        name: &str,
        value: &str,
    ) -> Result<(), sqlx::Error> {
        let mut conn = pool.acquire().await?;
        JOURNAL_SETTINGS.set_value(&mut conn, journal_id, name, value).await
    }
}

/// Reads and writes unlocalized `site_settings`.
pub struct SiteSettingsRepo;

impl SiteSettingsRepo {
    pub async fn get(pool: &PgPool, name: &str) -> Result<Option<String>, sqlx::Error> {
        let value: Option<Option<String>> = sqlx::query_scalar(
            "SELECT setting_value FROM site_settings WHERE setting_name = $1 AND locale = ''",
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;
        Ok(value.flatten())
    }

    pub async fn set(pool: &PgPool, name: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO site_settings (setting_name, locale, setting_value) VALUES ($1, '', $2) \
             ON CONFLICT (setting_name, locale) DO UPDATE SET setting_value = EXCLUDED.setting_value",
        )
        .bind(name)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Journals allowed to send bulk email. A malformed value counts as none.
    pub async fn bulk_email_context_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        Ok(Self::get(pool, SITE_SETTING_ENABLE_BULK_EMAILS)
            .await?
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default())
    }

    /// Locales the site supports. Defaults to `["en"]`.
    pub async fn supported_locales(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        Ok(Self::get(pool, SITE_SETTING_SUPPORTED_LOCALES)
            .await?
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_else(|| vec!["en".to_string()]))
    }
}
