//! Repository for the `versions` table.

use sqlx::PgPool;
use scholar_core::version::Version;

use crate::models::version::{InstalledVersion, PRODUCT_NAME, PRODUCT_TYPE_CORE};

const COLUMNS: &str = "major, minor, revision, build, date_installed, current";

pub struct VersionRepo;

impl VersionRepo {
    /// The installed version marked current.
    pub async fn current(pool: &PgPool) -> Result<Option<InstalledVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM versions \
             WHERE current = true AND product_type = $1 AND product = $2"
        );
        sqlx::query_as::<_, InstalledVersion>(&query)
            .bind(PRODUCT_TYPE_CORE)
            .bind(PRODUCT_NAME)
            .fetch_optional(pool)
            .await
    }

    /// Every version ever installed, newest first.
    pub async fn history(pool: &PgPool) -> Result<Vec<InstalledVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM versions \
             WHERE product_type = $1 AND product = $2 \
             ORDER BY date_installed DESC, major DESC, minor DESC, revision DESC, build DESC"
        );
        sqlx::query_as::<_, InstalledVersion>(&query)
            .bind(PRODUCT_TYPE_CORE)
            .bind(PRODUCT_NAME)
            .fetch_all(pool)
            .await
    }

    /// Record `version` as installed and current. Previous versions stay in
    /// the history.
    pub async fn install(pool: &PgPool, version: &Version) -> Result<InstalledVersion, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE versions SET current = false WHERE product_type = $1 AND product = $2")
            .bind(PRODUCT_TYPE_CORE)
            .bind(PRODUCT_NAME)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO versions (major, minor, revision, build, current, product_type, product) \
             VALUES ($1, $2, $3, $4, true, $5, $6) \
             ON CONFLICT (product_type, product, major, minor, revision, build) \
             DO UPDATE SET current = true \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, InstalledVersion>(&query)
            .bind(version.major)
            .bind(version.minor)
            .bind(version.revision)
            .bind(version.build)
            .bind(PRODUCT_TYPE_CORE)
            .bind(PRODUCT_NAME)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }
}
