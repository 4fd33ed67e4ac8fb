//! Repository for the `sessions` table.

use chrono::Duration;
use sqlx::PgPool;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries. `data` is deliberately absent.
const COLUMNS: &str = "session_id, user_id, ip_address, user_agent, created_at, last_used_at, remember";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (session_id, user_id, ip_address, user_agent, remember) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(&input.session_id)
            .bind(input.user_id)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .bind(input.remember)
            .fetch_one(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(pool)
            .await
    }

    /// Delete every session, logging out all users. Returns the number removed.
    pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions").execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions idle for longer than their lifetime.
    ///
    /// Remembered sessions use `remember_lifetime`, all others `lifetime`.
    pub async fn delete_expired(
        pool: &PgPool,
        lifetime: Duration,
        remember_lifetime: Duration,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sessions \
             WHERE (remember = false AND last_used_at < NOW() - make_interval(secs => $1)) \
                OR (remember = true AND last_used_at < NOW() - make_interval(secs => $2))",
        )
        .bind(lifetime.num_seconds() as f64)
        .bind(remember_lifetime.num_seconds() as f64)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
