use std::path::PathBuf;
use std::str::FromStr;

use scholar_core::payment::manager::DEFAULT_CLEANUP_ODDS;

use crate::auth::jwt::JwtConfig;

/// A configuration value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Which payment method journals collect money with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPluginKind {
    None,
    Manual,
}

impl FromStr for PaymentPluginKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "manual" => Ok(Self::Manual),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub plugin: PaymentPluginKind,
    /// Shown to users paying through the manual plugin.
    pub manual_instructions: String,
    /// Expired queued payments are purged on one queue operation in this many.
    pub cleanup_odds: u32,
}

#[derive(Debug, Clone)]
pub struct ScheduledTaskConfig {
    pub enabled: bool,
    /// Directory receiving one execution log per task run.
    pub log_dir: PathBuf,
    /// How often the runner checks for due tasks.
    pub tick_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle lifetime of an ordinary session.
    pub lifetime_hours: i64,
    /// Idle lifetime of a "remember me" session.
    pub remember_days: i64,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and JWT secret have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    pub database_url: String,
    /// Public base URL, used to build links handed to clients.
    pub base_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for background tasks at shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Warn site admins when the installed version is older than the code.
    pub show_upgrade_warning: bool,
    pub jwt: JwtConfig,
    pub payments: PaymentConfig,
    pub scheduled_tasks: ScheduledTaskConfig,
    pub sessions: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `DATABASE_URL`                | required                   |
    /// | `BASE_URL`                    | `http://localhost:3000`    |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                       |
    /// | `SHOW_UPGRADE_WARNING`        | `true`                     |
    /// | `PAYMENT_PLUGIN`              | `none` (`manual`)          |
    /// | `MANUAL_PAYMENT_INSTRUCTIONS` | empty                      |
    /// | `PAYMENT_CLEANUP_ODDS`        | `100`                      |
    /// | `SCHEDULED_TASKS_ENABLED`     | `true`                     |
    /// | `SCHEDULED_TASK_LOG_DIR`      | `./scheduledTaskLogs`      |
    /// | `SCHEDULED_TASK_TICK_SECS`    | `60`                       |
    /// | `SESSION_LIFETIME_HOURS`      | `2`                        |
    /// | `SESSION_REMEMBER_DAYS`       | `30`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let payments = PaymentConfig {
            plugin: env_or("PAYMENT_PLUGIN", PaymentPluginKind::None)?,
            manual_instructions: std::env::var("MANUAL_PAYMENT_INSTRUCTIONS").unwrap_or_default(),
            cleanup_odds: env_or("PAYMENT_CLEANUP_ODDS", DEFAULT_CLEANUP_ODDS)?,
        };

        let scheduled_tasks = ScheduledTaskConfig {
            enabled: env_or("SCHEDULED_TASKS_ENABLED", true)?,
            log_dir: std::env::var("SCHEDULED_TASK_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./scheduledTaskLogs")),
            tick_secs: env_or("SCHEDULED_TASK_TICK_SECS", 60)?,
        };

        let sessions = SessionConfig {
            lifetime_hours: env_or("SESSION_LIFETIME_HOURS", 2)?,
            remember_days: env_or("SESSION_REMEMBER_DAYS", 30)?,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000)?,
            database_url,
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30)?,
            show_upgrade_warning: env_or("SHOW_UPGRADE_WARNING", true)?,
            jwt: JwtConfig::from_env()?,
            payments,
            scheduled_tasks,
            sessions,
        })
    }

    /// Settings shown on the system information page, unsanitized.
    pub fn display_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("host", self.host.clone()),
            ("port", self.port.to_string()),
            ("base_url", self.base_url.clone()),
            ("database_url", self.database_url.clone()),
            ("jwt_secret", self.jwt.secret.clone()),
            ("request_timeout_secs", self.request_timeout_secs.to_string()),
            ("show_upgrade_warning", self.show_upgrade_warning.to_string()),
            ("payment_plugin", format!("{:?}", self.payments.plugin).to_lowercase()),
            ("payment_cleanup_odds", self.payments.cleanup_odds.to_string()),
            ("scheduled_tasks_enabled", self.scheduled_tasks.enabled.to_string()),
            (
                "scheduled_task_log_dir",
                self.scheduled_tasks.log_dir.display().to_string(),
            ),
            ("session_lifetime_hours", self.sessions.lifetime_hours.to_string()),
            ("session_remember_days", self.sessions.remember_days.to_string()),
        ]
    }
}

/// Parse an environment variable, falling back to `default` when unset.
pub(crate) fn env_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_plugin_names() {
        assert_eq!("manual".parse(), Ok(PaymentPluginKind::Manual));
        assert_eq!(" Manual ".parse(), Ok(PaymentPluginKind::Manual));
        assert_eq!("none".parse(), Ok(PaymentPluginKind::None));
        assert_eq!("".parse(), Ok(PaymentPluginKind::None));
        assert!("paypal".parse::<PaymentPluginKind>().is_err());
    }

    #[test]
    fn unset_variable_uses_default() {
        let port: u16 = env_or("SCHOLAR_TEST_UNSET_VARIABLE", 8080).unwrap();
        assert_eq!(port, 8080);
    }
}
