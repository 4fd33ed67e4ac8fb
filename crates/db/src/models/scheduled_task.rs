//! Scheduled task run bookkeeping.

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `scheduled_tasks` table. `last_run` is UTC.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduledTaskRun {
    pub class_name: String,
    pub last_run: Option<NaiveDateTime>,
}
