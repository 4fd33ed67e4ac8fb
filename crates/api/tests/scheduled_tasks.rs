//! Tests for the scheduled task runner.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;
use scholar_api::background::scheduled_tasks::run_due_tasks;
use scholar_core::payment::QueuedPayment;
use scholar_core::scheduled_task::{TASK_PURGE_EXPIRED_QUEUED_PAYMENTS, TASK_PURGE_EXPIRED_SESSIONS};
use scholar_db::repositories::{QueuedPaymentRepo, ScheduledTaskRepo};

#[sqlx::test(migrations = false)]
async fn due_tasks_run_once_and_write_logs(pool: PgPool) {
    scholar_db::run_migrations(&pool).await.unwrap();
    let log_dir = tempfile::tempdir().unwrap();
    let config = common::test_config(&log_dir.path().join("logs"));

    let expired = Utc::now().date_naive() - Duration::days(2);
    QueuedPaymentRepo::insert(&pool, &QueuedPayment::new(5.0, "USD", None, None), Some(expired))
        .await
        .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
    let reports = run_due_tasks(&pool, &config, now).await.unwrap();
    assert_eq!(reports.len(), 2);

    let payments = reports
        .iter()
        .find(|r| r.class_name == TASK_PURGE_EXPIRED_QUEUED_PAYMENTS)
        .unwrap();
    assert_eq!(payments.removed, 1);
    let log = std::fs::read_to_string(&payments.log_file).unwrap();
    assert!(log.contains("Task process started."));
    assert!(log.contains("Removed 1 expired record(s)."));
    assert!(payments
        .log_file
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .ends_with("-20240309.log"));

    assert_eq!(
        ScheduledTaskRepo::last_run(&pool, TASK_PURGE_EXPIRED_SESSIONS)
            .await
            .unwrap(),
        Some(now.naive_utc())
    );

    // Nothing is due a minute later.
    let reports = run_due_tasks(&pool, &config, now + Duration::minutes(1))
        .await
        .unwrap();
    assert!(reports.is_empty());

    // The hourly task is due again after an hour, the daily one is not.
    let reports = run_due_tasks(&pool, &config, now + Duration::hours(1))
        .await
        .unwrap();
    assert_matches!(reports.as_slice(), [report] if report.class_name == TASK_PURGE_EXPIRED_SESSIONS);
}
