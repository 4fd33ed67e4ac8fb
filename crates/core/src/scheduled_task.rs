//! Scheduled task names, frequencies and execution-log file helpers.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub const TASK_PURGE_EXPIRED_QUEUED_PAYMENTS: &str = "PurgeExpiredQueuedPayments";
pub const TASK_PURGE_EXPIRED_SESSIONS: &str = "PurgeExpiredSessions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
}

impl Frequency {
    pub fn period(self) -> Duration {
        match self {
            Self::Hourly => Duration::hours(1),
            Self::Daily => Duration::days(1),
            Self::Weekly => Duration::weeks(1),
        }
    }
}

/// A task known to the runner, keyed by `scheduled_tasks.class_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDefinition {
    pub class_name: &'static str,
    pub frequency: Frequency,
}

/// Every task the runner executes.
pub const TASKS: &[TaskDefinition] = &[
    TaskDefinition {
        class_name: TASK_PURGE_EXPIRED_QUEUED_PAYMENTS,
        frequency: Frequency::Daily,
    },
    TaskDefinition {
        class_name: TASK_PURGE_EXPIRED_SESSIONS,
        frequency: Frequency::Hourly,
    },
];

/// Whether a task last run at `last_run` is due at `now`.
///
/// Tasks that never ran are always due.
pub fn is_due(frequency: Frequency, last_run: Option<Timestamp>, now: Timestamp) -> bool {
    match last_run {
        None => true,
        Some(last) => now - last >= frequency.period(),
    }
}

// ---------------------------------------------------------------------------
// Execution logs
// ---------------------------------------------------------------------------

pub const LOG_FILE_EXTENSION: &str = "log";

/// File name of one execution log: `<task>-<run id>-<yyyymmdd>.log`.
pub fn log_file_name(class_name: &str, run_id: &str, now: Timestamp) -> String {
    let name: String = class_name.chars().filter(|c| !c.is_whitespace()).collect();
    format!(
        "{name}-{run_id}-{}.{LOG_FILE_EXTENSION}",
        now.format("%Y%m%d")
    )
}

/// Strip any directory components from a requested log file name.
///
/// Returns `None` when nothing usable is left.
pub fn log_file_basename(requested: &str) -> Option<&str> {
    let base = requested
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match base {
        "" | "." | ".." => None,
        _ => Some(base),
    }
}

/// One line of an execution log.
pub fn log_line(now: Timestamp, level: &str, message: &str) -> String {
    format!("[{}] [{level}] {message}\n", now.format("%Y-%m-%d %H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 9, h, m, 0).unwrap()
    }

    #[test]
    fn never_run_is_due() {
        assert!(is_due(Frequency::Weekly, None, at(0, 0)));
    }

    #[test]
    fn due_after_a_full_period() {
        assert!(!is_due(Frequency::Hourly, Some(at(10, 0)), at(10, 59)));
        assert!(is_due(Frequency::Hourly, Some(at(10, 0)), at(11, 0)));
        assert!(!is_due(Frequency::Daily, Some(at(0, 0)), at(23, 59)));
    }

    #[test]
    fn log_file_name_has_task_run_and_date() {
        assert_eq!(
            log_file_name("Purge Expired Sessions", "42", at(8, 0)),
            "PurgeExpiredSessions-42-20240309.log"
        );
    }

    #[test]
    fn basename_drops_directories() {
        assert_eq!(log_file_basename("../../etc/passwd"), Some("passwd"));
        assert_eq!(log_file_basename("..\\secret.log"), Some("secret.log"));
        assert_eq!(log_file_basename("task-1-20240309.log"), Some("task-1-20240309.log"));
        assert_eq!(log_file_basename("logs/"), None);
        assert_eq!(log_file_basename(".."), None);
        assert_eq!(log_file_basename(""), None);
    }

    #[test]
    fn every_task_is_named_once() {
        let mut names: Vec<_> = TASKS.iter().map(|t| t.class_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TASKS.len());
    }

    #[test]
    fn log_line_format() {
        assert_eq!(
            log_line(at(8, 5), "notice", "started"),
            "[2024-03-09 08:05:00] [notice] started\n"
        );
    }
}
