//! Repository for announcements and announcement types.
//!
//! Both carry localized settings in companion `*_settings` tables; every
//! method that returns an entity returns it with its settings.

use sqlx::PgPool;
use scholar_core::types::DbId;

use crate::models::announcement::{
    Announcement, AnnouncementType, AnnouncementTypeWithSettings, AnnouncementWithSettings,
    CreateAnnouncement, CreateAnnouncementType, UpdateAnnouncement, ANNOUNCEMENT_TYPE_NAME,
};
use crate::repositories::settings::{ANNOUNCEMENT_SETTINGS, ANNOUNCEMENT_TYPE_SETTINGS};

/// Column list for `announcements` queries.
const ANNOUNCEMENT_COLUMNS: &str = "\
    announcement_id AS id, assoc_type, assoc_id, type_id, date_expire, date_posted";

/// Column list for `announcement_types` queries.
const TYPE_COLUMNS: &str = "type_id AS id, assoc_type, assoc_id";

/// Maximum number of announcements returned by a listing.
const MAX_LIMIT: i64 = 200;

/// Provides CRUD operations for announcements.
pub struct AnnouncementRepo;

impl AnnouncementRepo {
    /// Insert an announcement and its localized settings, posted now.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAnnouncement,
    ) -> Result<AnnouncementWithSettings, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO announcements (assoc_type, assoc_id, type_id, date_expire, date_posted) \
             VALUES ($1, $2, $3, $4, NOW() AT TIME ZONE 'UTC') \
             RETURNING {ANNOUNCEMENT_COLUMNS}"
        );
        let announcement = sqlx::query_as::<_, Announcement>(&query)
            .bind(input.assoc_type)
            .bind(input.assoc_id)
            .bind(input.type_id)
            .bind(input.date_expire)
            .fetch_one(&mut *tx)
            .await?;

        for (name, values) in input.settings() {
            ANNOUNCEMENT_SETTINGS
                .set_localized(&mut tx, announcement.id, name, values)
                .await?;
        }
        let settings = ANNOUNCEMENT_SETTINGS.load_one(&mut *tx, announcement.id).await?;

        tx.commit().await?;
        Ok(AnnouncementWithSettings {
            announcement,
            settings,
        })
    }

    /// Find an announcement by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AnnouncementWithSettings>, sqlx::Error> {
        let query = format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE announcement_id = $1");
        let Some(announcement) = sqlx::query_as::<_, Announcement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        let settings = ANNOUNCEMENT_SETTINGS.load_one(pool, id).await?;
        Ok(Some(AnnouncementWithSettings {
            announcement,
            settings,
        }))
    }

    /// Announcements of an object, newest first.
    ///
    /// With `active_only`, announcements whose expiry date has passed are
    /// left out.
    pub async fn list_by_assoc(
        pool: &PgPool,
        assoc_type: i16,
        assoc_id: DbId,
        active_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<AnnouncementWithSettings>, sqlx::Error> {
        let limit = limit.unwrap_or(MAX_LIMIT).clamp(1, MAX_LIMIT);
        let expiry_filter = if active_only {
            "AND (date_expire IS NULL OR date_expire >= CURRENT_DATE)"
        } else {
            ""
        };
        let query = format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements \
             WHERE assoc_type = $1 AND assoc_id = $2 {expiry_filter} \
             ORDER BY date_posted DESC, announcement_id DESC \
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Announcement>(&query)
            .bind(assoc_type)
            .bind(assoc_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        let ids: Vec<DbId> = rows.iter().map(|a| a.id).collect();
        let mut settings = ANNOUNCEMENT_SETTINGS.load(pool, &ids).await?;
        Ok(rows
            .into_iter()
            .map(|announcement| AnnouncementWithSettings {
                settings: settings.remove(&announcement.id).unwrap_or_default(),
                announcement,
            })
            .collect())
    }

    /// Apply a patch. Returns `None` if no announcement with the ID exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAnnouncement,
    ) -> Result<Option<AnnouncementWithSettings>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE announcements SET \
                type_id = COALESCE($2, type_id), \
                date_expire = COALESCE($3, date_expire) \
             WHERE announcement_id = $1 \
             RETURNING {ANNOUNCEMENT_COLUMNS}"
        );
        let Some(announcement) = sqlx::query_as::<_, Announcement>(&query)
            .bind(id)
            .bind(input.type_id)
            .bind(input.date_expire)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        for (name, values) in input.settings() {
            ANNOUNCEMENT_SETTINGS.set_localized(&mut tx, id, name, values).await?;
        }
        let settings = ANNOUNCEMENT_SETTINGS.load_one(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(Some(AnnouncementWithSettings {
            announcement,
            settings,
        }))
    }

    /// Delete an announcement and its settings. Returns `true` if it existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        ANNOUNCEMENT_SETTINGS.delete_all(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM announcements WHERE announcement_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides CRUD operations for announcement types.
pub struct AnnouncementTypeRepo;

impl AnnouncementTypeRepo {
    /// Insert a type with its localized name.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAnnouncementType,
    ) -> Result<AnnouncementTypeWithSettings, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO announcement_types (assoc_type, assoc_id) VALUES ($1, $2) \
             RETURNING {TYPE_COLUMNS}"
        );
        let announcement_type = sqlx::query_as::<_, AnnouncementType>(&query)
            .bind(input.assoc_type)
            .bind(input.assoc_id)
            .fetch_one(&mut *tx)
            .await?;

        ANNOUNCEMENT_TYPE_SETTINGS
            .set_localized(&mut tx, announcement_type.id, ANNOUNCEMENT_TYPE_NAME, &input.name)
            .await?;
        let settings = ANNOUNCEMENT_TYPE_SETTINGS
            .load_one(&mut *tx, announcement_type.id)
            .await?;

        tx.commit().await?;
        Ok(AnnouncementTypeWithSettings {
            announcement_type,
            settings,
        })
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AnnouncementTypeWithSettings>, sqlx::Error> {
        let query = format!("SELECT {TYPE_COLUMNS} FROM announcement_types WHERE type_id = $1");
        let Some(announcement_type) = sqlx::query_as::<_, AnnouncementType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        let settings = ANNOUNCEMENT_TYPE_SETTINGS.load_one(pool, id).await?;
        Ok(Some(AnnouncementTypeWithSettings {
            announcement_type,
            settings,
        }))
    }

    /// Types defined for an object, oldest first.
    pub async fn list_by_assoc(
        pool: &PgPool,
        assoc_type: i16,
        assoc_id: DbId,
    ) -> Result<Vec<AnnouncementTypeWithSettings>, sqlx::Error> {
        let query = format!(
            "SELECT {TYPE_COLUMNS} FROM announcement_types \
             WHERE assoc_type = $1 AND assoc_id = $2 ORDER BY type_id"
        );
        let rows = sqlx::query_as::<_, AnnouncementType>(&query)
            .bind(assoc_type)
            .bind(assoc_id)
            .fetch_all(pool)
            .await?;

        let ids: Vec<DbId> = rows.iter().map(|t| t.id).collect();
        let mut settings = ANNOUNCEMENT_TYPE_SETTINGS.load(pool, &ids).await?;
        Ok(rows
            .into_iter()
            .map(|announcement_type| AnnouncementTypeWithSettings {
                settings: settings.remove(&announcement_type.id).unwrap_or_default(),
                announcement_type,
            })
            .collect())
    }

    /// Delete a type together with the announcements of that type.
    ///
    /// Returns `true` if the type existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "DELETE FROM announcement_settings WHERE announcement_id IN \
             (SELECT announcement_id FROM announcements WHERE type_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM announcements WHERE type_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        ANNOUNCEMENT_TYPE_SETTINGS.delete_all(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM announcement_types WHERE type_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
