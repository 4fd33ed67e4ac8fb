//! Repository for the `subeditor_submission_group` table.
//!
//! A subeditor is assigned to a submission group (a section or a category)
//! within a journal.

use sqlx::PgPool;
use scholar_core::types::DbId;

use crate::models::subeditor::SubeditorAssignment;

const COLUMNS: &str = "context_id, assoc_type, assoc_id, user_id";

pub struct SubeditorRepo;

impl SubeditorRepo {
    /// Assign a user. Returns `false` if the assignment already existed.
    pub async fn assign(
        pool: &PgPool,
        context_id: DbId,
        assoc_type: i64,
        assoc_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO subeditor_submission_group (context_id, assoc_type, assoc_id, user_id) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (context_id, assoc_id, assoc_type, user_id) DO NOTHING",
        )
        .bind(context_id)
        .bind(assoc_type)
        .bind(assoc_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Subeditors of one section or category.
    pub async fn list_by_group(
        pool: &PgPool,
        context_id: DbId,
        assoc_type: i64,
        assoc_id: DbId,
    ) -> Result<Vec<SubeditorAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subeditor_submission_group \
             WHERE context_id = $1 AND assoc_type = $2 AND assoc_id = $3 \
             ORDER BY user_id"
        );
        sqlx::query_as::<_, SubeditorAssignment>(&query)
            .bind(context_id)
            .bind(assoc_type)
            .bind(assoc_id)
            .fetch_all(pool)
            .await
    }

    /// Every group a user is assigned to within a journal.
    pub async fn list_by_user(
        pool: &PgPool,
        context_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<SubeditorAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subeditor_submission_group \
             WHERE context_id = $1 AND user_id = $2 \
             ORDER BY assoc_type, assoc_id"
        );
        sqlx::query_as::<_, SubeditorAssignment>(&query)
            .bind(context_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Remove an assignment. Returns `true` if a row was removed.
    pub async fn remove(
        pool: &PgPool,
        context_id: DbId,
        assoc_type: i64,
        assoc_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM subeditor_submission_group \
             WHERE context_id = $1 AND assoc_type = $2 AND assoc_id = $3 AND user_id = $4",
        )
        .bind(context_id)
        .bind(assoc_type)
        .bind(assoc_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
