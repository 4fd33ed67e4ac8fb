//! Repository for the `pub_object_identifiers` table, and the PostgreSQL
//! implementation of the public-identifier uniqueness lookup.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::PgPool;
use scholar_core::assoc::AssocType;
use scholar_core::error::CoreError;
use scholar_core::pub_ids::{PubIdRegistry, PubObject};
use scholar_core::types::DbId;

use crate::models::pub_id::PubObjectIdentifier;

const COLUMNS: &str = "id, context_id, assoc_type, assoc_id, pub_id_type, pub_id";

/// Unique index keeping an identifier to one object of a type per journal.
pub const PUB_ID_UNIQUE_INDEX: &str = "pub_object_identifiers_pub_id";

/// Whether `err` is a clash on [`PUB_ID_UNIQUE_INDEX`].
pub fn is_duplicate_pub_id(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.is_unique_violation()
            && db.constraint() == Some(PUB_ID_UNIQUE_INDEX)
    )
}

/// Upsert of one identifier. An object's identifiers never move to another
/// journal: a row owned by a different context is left untouched.
const UPSERT: &str = "INSERT INTO pub_object_identifiers \
        (context_id, assoc_type, assoc_id, pub_id_type, pub_id) \
     VALUES ($1, $2, $3, $4, $5) \
     ON CONFLICT (assoc_type, assoc_id, pub_id_type) \
     DO UPDATE SET pub_id = EXCLUDED.pub_id \
     WHERE pub_object_identifiers.context_id = EXCLUDED.context_id";

pub struct PubIdRepo;

impl PubIdRepo {
    /// Journals holding identifiers of the object; at most one in practice.
    pub async fn owner_contexts(
        pool: &PgPool,
        assoc_type: AssocType,
        assoc_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT context_id FROM pub_object_identifiers \
             WHERE assoc_type = $1 AND assoc_id = $2 \
             ORDER BY context_id",
        )
        .bind(assoc_type.code())
        .bind(assoc_id)
        .fetch_all(pool)
        .await
    }

    /// Pub id type -> value for one object of the journal.
    pub async fn stored_pub_ids(
        pool: &PgPool,
        context_id: DbId,
        assoc_type: AssocType,
        assoc_id: DbId,
    ) -> Result<BTreeMap<String, String>, sqlx::Error> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT pub_id_type, pub_id FROM pub_object_identifiers \
             WHERE context_id = $1 AND assoc_type = $2 AND assoc_id = $3",
        )
        .bind(context_id)
        .bind(assoc_type.code())
        .bind(assoc_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Store one pub id of an object; `None` or empty removes it.
    pub async fn set_pub_id(
        pool: &PgPool,
        context_id: DbId,
        assoc_type: AssocType,
        assoc_id: DbId,
        pub_id_type: &str,
        pub_id: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        match pub_id.filter(|v| !v.is_empty()) {
            Some(value) => {
                sqlx::query(UPSERT)
                    .bind(context_id)
                    .bind(assoc_type.code())
                    .bind(assoc_id)
                    .bind(pub_id_type)
                    .bind(value)
                    .execute(pool)
                    .await?;
            }
            None => {
                sqlx::query(
                    "DELETE FROM pub_object_identifiers \
                     WHERE context_id = $1 AND assoc_type = $2 AND assoc_id = $3 \
                       AND pub_id_type = $4",
                )
                .bind(context_id)
                .bind(assoc_type.code())
                .bind(assoc_id)
                .bind(pub_id_type)
                .execute(pool)
                .await?;
            }
        }
        Ok(())
    }

    /// Make the stored identifiers of an object match `object` exactly.
    pub async fn save_object(
        pool: &PgPool,
        context_id: DbId,
        object: &PubObject,
    ) -> Result<(), sqlx::Error> {
        let assoc_type = object.kind.assoc_type();
        let mut tx = pool.begin().await?;

        let types: Vec<String> = object.stored_pub_ids.keys().cloned().collect();
        sqlx::query(
            "DELETE FROM pub_object_identifiers \
             WHERE context_id = $1 AND assoc_type = $2 AND assoc_id = $3 \
               AND NOT (pub_id_type = ANY($4))",
        )
        .bind(context_id)
        .bind(assoc_type.code())
        .bind(object.id)
        .bind(&types)
        .execute(&mut *tx)
        .await?;

        for (pub_id_type, pub_id) in &object.stored_pub_ids {
            sqlx::query(UPSERT)
                .bind(context_id)
                .bind(assoc_type.code())
                .bind(object.id)
                .bind(pub_id_type)
                .bind(pub_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Whether another object in the journal already uses the identifier.
    ///
    /// The object `(assoc_type, exclude_id)` itself is ignored. With
    /// `for_same_type`, only objects of `assoc_type` are considered.
    pub async fn any_pub_id_exists(
        pool: &PgPool,
        context_id: DbId,
        pub_id_type: &str,
        pub_id: &str,
        assoc_type: AssocType,
        exclude_id: DbId,
        for_same_type: bool,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
                SELECT 1 FROM pub_object_identifiers \
                WHERE context_id = $1 AND pub_id_type = $2 AND pub_id = $3 \
                  AND NOT (assoc_type = $4 AND assoc_id = $5) \
                  AND (NOT $6 OR assoc_type = $4))",
        )
        .bind(context_id)
        .bind(pub_id_type)
        .bind(pub_id)
        .bind(assoc_type.code())
        .bind(exclude_id)
        .bind(for_same_type)
        .fetch_one(pool)
        .await
    }
}

/// [`PubIdRegistry`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgPubIdRegistry {
    pool: PgPool,
}

impl PgPubIdRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PubIdRegistry for PgPubIdRegistry {
    async fn any_pub_id_exists(
        &self,
        context_id: DbId,
        pub_id_type: &str,
        pub_id: &str,
        assoc_type: AssocType,
        exclude_id: DbId,
        for_same_type: bool,
    ) -> Result<bool, CoreError> {
        PubIdRepo::any_pub_id_exists(
            &self.pool,
            context_id,
            pub_id_type,
            pub_id,
            assoc_type,
            exclude_id,
            for_same_type,
        )
        .await
        .map_err(|e| CoreError::Internal(format!("Pub id lookup failed: {e}")))
    }
}
