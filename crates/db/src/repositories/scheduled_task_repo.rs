//! Repository for the `scheduled_tasks` table.

use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::models::scheduled_task::ScheduledTaskRun;

/// Reads and records when each scheduled task last ran.
pub struct ScheduledTaskRepo;

impl ScheduledTaskRepo {
    /// Last run time of a task, or `None` if it never ran.
    pub async fn last_run(
        pool: &PgPool,
        class_name: &str,
    ) -> Result<Option<NaiveDateTime>, sqlx::Error> {
        let last_run: Option<Option<NaiveDateTime>> =
            sqlx::query_scalar("SELECT last_run FROM scheduled_tasks WHERE class_name = $1")
                .bind(class_name)
                .fetch_optional(pool)
                .await?;
        Ok(last_run.flatten())
    }

    /// Record a run, inserting the task row on first use.
    pub async fn update_last_run(
        pool: &PgPool,
        class_name: &str,
        at: NaiveDateTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO scheduled_tasks (class_name, last_run) VALUES ($1, $2) \
             ON CONFLICT (class_name) DO UPDATE SET last_run = EXCLUDED.last_run",
        )
        .bind(class_name)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Every recorded task, by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<ScheduledTaskRun>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledTaskRun>(
            "SELECT class_name, last_run FROM scheduled_tasks ORDER BY class_name",
        )
        .fetch_all(pool)
        .await
    }
}
