//! Runner for the periodic maintenance tasks in [`TASKS`].
//!
//! Every tick the runner checks each task's `last_run` against its
//! frequency and executes the due ones. Each execution writes its own log
//! file into the configured log directory, which site admins can download
//! or clear from the admin area.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use scholar_core::scheduled_task::{
    self, TaskDefinition, TASKS, TASK_PURGE_EXPIRED_QUEUED_PAYMENTS, TASK_PURGE_EXPIRED_SESSIONS,
};
use scholar_core::types::Timestamp;
use scholar_db::repositories::{QueuedPaymentRepo, ScheduledTaskRepo, SessionRepo};

use crate::config::ServerConfig;

/// A task run failed before or after its work could be recorded.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Log file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown task '{0}'")]
    UnknownTask(String),
}

/// Outcome of one executed task.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub class_name: &'static str,
    /// Rows removed by the task.
    pub removed: u64,
    pub log_file: PathBuf,
}

/// Run the scheduled task loop until `cancel` is triggered.
pub async fn run(pool: PgPool, config: Arc<ServerConfig>, cancel: CancellationToken) {
    let tick = Duration::from_secs(config.scheduled_tasks.tick_secs.max(1));
    tracing::info!(
        tick_secs = tick.as_secs(),
        log_dir = %config.scheduled_tasks.log_dir.display(),
        "Scheduled task runner started"
    );

    let mut interval = tokio::time::interval(tick);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Scheduled task runner stopping");
                break;
            }
            _ = interval.tick() => {
                match run_due_tasks(&pool, &config, Utc::now()).await {
                    Ok(reports) if reports.is_empty() => {
                        tracing::debug!("Scheduled tasks: nothing due");
                    }
                    Ok(reports) => {
                        for report in reports {
                            tracing::info!(
                                task = report.class_name,
                                removed = report.removed,
                                log_file = %report.log_file.display(),
                                "Scheduled task executed"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Scheduled tasks: run failed");
                    }
                }
            }
        }
    }
}

/// Execute every task due at `now` and record its run time.
///
/// A task whose work fails is logged to its execution log and keeps its
/// previous `last_run`, so it is retried on the next tick.
pub async fn run_due_tasks(
    pool: &PgPool,
    config: &ServerConfig,
    now: Timestamp,
) -> Result<Vec<TaskReport>, TaskError> {
    tokio::fs::create_dir_all(&config.scheduled_tasks.log_dir).await?;

    let mut reports = Vec::new();
    for task in TASKS {
        let last_run = ScheduledTaskRepo::last_run(pool, task.class_name)
            .await?
            .map(|at| at.and_utc());
        if !scheduled_task::is_due(task.frequency, last_run, now) {
            continue;
        }

        let run_id = uuid::Uuid::new_v4().simple().to_string();
        let log_file = config
            .scheduled_tasks
            .log_dir
            .join(scheduled_task::log_file_name(task.class_name, &run_id, now));
        let mut log = tokio::fs::File::create(&log_file).await?;
        log.write_all(scheduled_task::log_line(now, "NOTICE", "Task process started.").as_bytes())
            .await?;

        match execute(pool, config, task).await {
            Ok(removed) => {
                let message = format!("Removed {removed} expired record(s).");
                log.write_all(scheduled_task::log_line(now, "NOTICE", &message).as_bytes())
                    .await?;
                log.write_all(
                    scheduled_task::log_line(now, "NOTICE", "Task process stopped.").as_bytes(),
                )
                .await?;
                ScheduledTaskRepo::update_last_run(pool, task.class_name, now.naive_utc()).await?;
                reports.push(TaskReport {
                    class_name: task.class_name,
                    removed,
                    log_file,
                });
            }
            Err(e) => {
                log.write_all(scheduled_task::log_line(now, "ERROR", &e.to_string()).as_bytes())
                    .await?;
                tracing::error!(task = task.class_name, error = %e, "Scheduled task failed");
            }
        }
        log.flush().await?;
    }
    Ok(reports)
}

async fn execute(
    pool: &PgPool,
    config: &ServerConfig,
    task: &TaskDefinition,
) -> Result<u64, TaskError> {
    match task.class_name {
        TASK_PURGE_EXPIRED_QUEUED_PAYMENTS => Ok(QueuedPaymentRepo::delete_expired(pool).await?),
        TASK_PURGE_EXPIRED_SESSIONS => Ok(SessionRepo::delete_expired(
            pool,
            chrono::Duration::hours(config.sessions.lifetime_hours),
            chrono::Duration::days(config.sessions.remember_days),
        )
        .await?),
        other => Err(TaskError::UnknownTask(other.to_string())),
    }
}
