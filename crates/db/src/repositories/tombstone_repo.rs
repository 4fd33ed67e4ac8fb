//! Repository for data object tombstones and their OAI set objects.

use std::collections::BTreeMap;

use sqlx::PgPool;
use scholar_core::tombstone::DataObjectTombstone;
use scholar_core::types::{DbId, Timestamp};

use crate::models::tombstone::{SetObjectRow, TombstoneRow};

/// Column list for `data_object_tombstones` queries.
const COLUMNS: &str = "\
    tombstone_id AS id, data_object_id, date_deleted, set_spec, set_name, oai_identifier";

pub struct TombstoneRepo;

impl TombstoneRepo {
    /// Store a tombstone and its set objects. A missing deletion date is
    /// stamped with the current time. Returns the stored tombstone.
    pub async fn insert(
        pool: &PgPool,
        tombstone: &DataObjectTombstone,
    ) -> Result<DataObjectTombstone, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO data_object_tombstones \
                (data_object_id, date_deleted, set_spec, set_name, oai_identifier) \
             VALUES ($1, COALESCE($2, NOW()), $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TombstoneRow>(&query)
            .bind(tombstone.data_object_id)
            .bind(tombstone.date_deleted)
            .bind(&tombstone.set_spec)
            .bind(&tombstone.set_name)
            .bind(&tombstone.oai_identifier)
            .fetch_one(&mut *tx)
            .await?;

        for (assoc_type, assoc_id) in &tombstone.oai_set_objects_ids {
            sqlx::query(
                "INSERT INTO data_object_tombstone_oai_set_objects (tombstone_id, assoc_type, assoc_id) \
                 VALUES ($1, $2, $3)",
            )
            .bind(row.id)
            .bind(assoc_type)
            .bind(assoc_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row.with_set_objects(tombstone.oai_set_objects_ids.clone()))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DataObjectTombstone>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM data_object_tombstones WHERE tombstone_id = $1");
        let rows = sqlx::query_as::<_, TombstoneRow>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;
        Ok(with_set_objects(pool, rows).await?.pop())
    }

    /// The most recent tombstone left by a deleted object.
    pub async fn find_by_data_object_id(
        pool: &PgPool,
        data_object_id: DbId,
    ) -> Result<Option<DataObjectTombstone>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM data_object_tombstones \
             WHERE data_object_id = $1 ORDER BY tombstone_id DESC LIMIT 1"
        );
        let rows = sqlx::query_as::<_, TombstoneRow>(&query)
            .bind(data_object_id)
            .fetch_all(pool)
            .await?;
        Ok(with_set_objects(pool, rows).await?.pop())
    }

    /// Tombstones for OAI harvesting: optionally restricted to sets whose
    /// spec starts with `set_spec`, and to deletions within `[from, until]`.
    pub async fn list_for_harvest(
        pool: &PgPool,
        set_spec: Option<&str>,
        from: Option<Timestamp>,
        until: Option<Timestamp>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DataObjectTombstone>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM data_object_tombstones \
             WHERE ($1::TEXT IS NULL OR set_spec = $1 OR set_spec LIKE $1 || ':%') \
               AND ($2::TIMESTAMPTZ IS NULL OR date_deleted >= $2) \
               AND ($3::TIMESTAMPTZ IS NULL OR date_deleted <= $3) \
             ORDER BY tombstone_id \
             LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, TombstoneRow>(&query)
            .bind(set_spec)
            .bind(from)
            .bind(until)
            .bind(limit.clamp(1, 500))
            .bind(offset.max(0))
            .fetch_all(pool)
            .await?;
        with_set_objects(pool, rows).await
    }

    /// Delete a tombstone (the object was restored). Set objects cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM data_object_tombstones WHERE tombstone_id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every tombstone of a data object.
    pub async fn delete_by_data_object_id(
        pool: &PgPool,
        data_object_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM data_object_tombstones WHERE data_object_id = $1")
            .bind(data_object_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

async fn with_set_objects(
    pool: &PgPool,
    rows: Vec<TombstoneRow>,
) -> Result<Vec<DataObjectTombstone>, sqlx::Error> {
    let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
    let set_objects = if ids.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as::<_, SetObjectRow>(
            "SELECT tombstone_id, assoc_type, assoc_id \
             FROM data_object_tombstone_oai_set_objects WHERE tombstone_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?
    };

    let mut by_tombstone: BTreeMap<DbId, BTreeMap<i64, DbId>> = BTreeMap::new();
    for o in set_objects {
        by_tombstone
            .entry(o.tombstone_id)
            .or_default()
            .insert(o.assoc_type, o.assoc_id);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let objects = by_tombstone.remove(&row.id).unwrap_or_default();
            row.with_set_objects(objects)
        })
        .collect())
}
