//! Handlers for the site administration area (`/admin`).
//!
//! All handlers require the `site_admin` role via [`RequireSiteAdmin`].
//! Administration is site-wide: the same operations addressed through a
//! journal are refused by [`refuse_in_context`].

use std::collections::BTreeMap;
use std::path::Path as FsPath;

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use scholar_core::admin::{
    self, AdminPage, ContextSummary, SettingsPage, SystemInfoPage, UpgradeNotice, VersionEntry,
    WizardPage, ADMIN_OPERATIONS,
};
use scholar_core::error::CoreError;
use scholar_core::scheduled_task::{self, Frequency, LOG_FILE_EXTENSION, TASKS};
use scholar_core::version::Version;
use scholar_db::models::journal::CreateJournal;
use scholar_db::repositories::{
    JournalRepo, ScheduledTaskRepo, SessionRepo, SiteSettingsRepo, VersionRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireSiteAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct IndexBody {
    pub context_count: i64,
    pub operations: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct ContextsBody {
    pub contexts: Vec<ContextSummary>,
}

/// Request body for `POST /admin/contexts`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContextRequest {
    #[validate(length(min = 1, max = 32), custom(function = "validate_context_path"))]
    pub path: String,
    #[validate(length(min = 2, max = 14))]
    pub primary_locale: String,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub enabled: Option<bool>,
}

/// Journal paths appear in URLs: letters, digits, `-` and `_` only.
fn validate_context_path(path: &str) -> Result<(), ValidationError> {
    if path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("context_path"))
    }
}

#[derive(Debug, Serialize)]
pub struct ExpireSessionsResult {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct ScheduledTaskStatus {
    pub class_name: &'static str,
    pub frequency: Frequency,
    pub last_run: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Serialize)]
pub struct ClearLogsResult {
    pub deleted: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn admin_url(state: &AppState) -> String {
    format!("{}/api/v1/admin", state.config.base_url.trim_end_matches('/'))
}

/// The upgrade notice for the installed version, when one applies.
async fn upgrade(state: &AppState) -> AppResult<Option<UpgradeNotice>> {
    let installed = VersionRepo::current(&state.pool)
        .await?
        .map(|row| row.version());
    Ok(admin::upgrade_notice(
        state.config.show_upgrade_warning,
        installed.as_ref(),
        &Version::code_version(),
    ))
}

async fn page<T: Serialize>(
    state: &AppState,
    operation: &str,
    body: T,
) -> AppResult<Json<DataResponse<AdminPage<T>>>> {
    let upgrade = upgrade(state).await?;
    Ok(Json(DataResponse {
        data: AdminPage::new(operation, &admin_url(state), upgrade, body),
    }))
}

fn is_log_file(path: &FsPath) -> bool {
    path.extension()
        .is_some_and(|ext| ext == LOG_FILE_EXTENSION)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin
pub async fn index(
    RequireSiteAdmin(_admin): RequireSiteAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let context_count = JournalRepo::count(&state.pool).await?;
    page(
        &state,
        "index",
        IndexBody {
            context_count,
            operations: ADMIN_OPERATIONS,
        },
    )
    .await
}

/// GET /api/v1/admin/contexts
pub async fn contexts(
    RequireSiteAdmin(_admin): RequireSiteAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let contexts = JournalRepo::list(&state.pool).await?;
    let body = ContextsBody {
        contexts: contexts.iter().map(ContextSummary::from).collect(),
    };
    page(&state, "contexts", body).await
}

/// POST /api/v1/admin/contexts
///
/// Create a hosted journal. A duplicate path answers 409.
pub async fn create_context(
    RequireSiteAdmin(admin_user): RequireSiteAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateContextRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ContextSummary>>)> {
    input.validate()?;

    let journal = JournalRepo::create(
        &state.pool,
        &CreateJournal {
            path: input.path,
            primary_locale: input.primary_locale,
            name: input.name,
            enabled: input.enabled,
        },
    )
    .await?;

    tracing::info!(
        journal_id = journal.id,
        path = %journal.path,
        admin_id = admin_user.user_id,
        "Journal created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ContextSummary::from(&journal),
        }),
    ))
}

/// GET /api/v1/admin/settings
///
/// On a single-journal site only the tabs that still apply are available.
pub async fn settings(
    RequireSiteAdmin(_admin): RequireSiteAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let context_count = JournalRepo::count(&state.pool).await?;
    let body = SettingsPage {
        component_availability: admin::site_settings_availability(context_count),
        supported_locales: SiteSettingsRepo::supported_locales(&state.pool).await?,
    };
    page(&state, "settings", body).await
}

/// GET /api/v1/admin/wizard/{id}
///
/// The settings wizard of one journal. Anything but a known numeric id is 404.
pub async fn wizard(
    RequireSiteAdmin(_admin): RequireSiteAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let journal_id = admin::parse_wizard_context_id(Some(&id))
        .ok_or_else(|| AppError::NotFound(format!("No journal '{id}'")))?;
    let journal = JournalRepo::find_by_id(&state.pool, journal_id)
        .await?
        .ok_or(AppError::not_found("Journal", journal_id))?;

    let bulk_email_contexts = SiteSettingsRepo::bulk_email_context_ids(&state.pool).await?;
    page(&state, "wizard", WizardPage::new(&journal, &bulk_email_contexts)).await
}

/// GET /api/v1/admin/system-info
///
/// Version history, server details and the running configuration with
/// secrets masked.
pub async fn system_info(
    RequireSiteAdmin(_admin): RequireSiteAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let history = VersionRepo::history(&state.pool).await?;
    let current_version = history.iter().find(|v| v.current).map(VersionEntry::from);
    let db_version = scholar_db::server_version(&state.pool).await?;

    let server_info = BTreeMap::from([
        ("admin.server.platform", std::env::consts::OS.to_string()),
        ("admin.server.architecture", std::env::consts::ARCH.to_string()),
        ("admin.server.appVersion", env!("CARGO_PKG_VERSION").to_string()),
        ("admin.server.dbDriver", "postgres".to_string()),
        ("admin.server.dbVersion", db_version),
    ]);

    let body = SystemInfoPage {
        current_version,
        version_history: history.iter().map(VersionEntry::from).collect(),
        server_info,
        config_data: admin::sanitize_config(state.config.display_entries()),
    };
    page(&state, "system_info", body).await
}

/// POST /api/v1/admin/expire-sessions
///
/// Sign every user out by deleting all sessions.
pub async fn expire_sessions(
    RequireSiteAdmin(admin_user): RequireSiteAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ExpireSessionsResult>>> {
    let deleted = SessionRepo::delete_all(&state.pool).await?;
    tracing::info!(deleted, admin_id = admin_user.user_id, "All sessions expired");
    Ok(Json(DataResponse {
        data: ExpireSessionsResult { deleted },
    }))
}

/// GET /api/v1/admin/scheduled-tasks
pub async fn scheduled_tasks(
    RequireSiteAdmin(_admin): RequireSiteAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ScheduledTaskStatus>>>> {
    let runs: BTreeMap<String, Option<chrono::NaiveDateTime>> =
        ScheduledTaskRepo::list(&state.pool)
            .await?
            .into_iter()
            .map(|run| (run.class_name, run.last_run))
            .collect();

    let tasks = TASKS
        .iter()
        .map(|task| ScheduledTaskStatus {
            class_name: task.class_name,
            frequency: task.frequency,
            last_run: runs.get(task.class_name).copied().flatten(),
        })
        .collect();
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/admin/scheduled-task-logs/{file}
///
/// Download one execution log. Only the base name of `file` is used, so
/// the request cannot leave the log directory.
pub async fn download_scheduled_task_log_file(
    RequireSiteAdmin(_admin): RequireSiteAdmin,
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> AppResult<impl IntoResponse> {
    let basename = scheduled_task::log_file_basename(&file)
        .filter(|name| is_log_file(FsPath::new(name)))
        .ok_or_else(|| AppError::NotFound(format!("No log file '{file}'")))?;

    let path = state.config.scheduled_tasks.log_dir.join(basename);
    let contents = tokio::fs::read(&path).await?;

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{basename}\""),
            ),
        ],
        contents,
    ))
}

/// DELETE /api/v1/admin/scheduled-task-logs
///
/// Remove every execution log. A missing log directory counts as empty.
pub async fn clear_scheduled_task_log_files(
    RequireSiteAdmin(admin_user): RequireSiteAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ClearLogsResult>>> {
    let dir = &state.config.scheduled_tasks.log_dir;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Json(DataResponse {
                data: ClearLogsResult { deleted: 0 },
            }));
        }
        Err(e) => return Err(e.into()),
    };

    let mut deleted = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && is_log_file(&path) {
            tokio::fs::remove_file(&path).await?;
            deleted += 1;
        }
    }

    tracing::info!(deleted, admin_id = admin_user.user_id, "Scheduled task logs cleared");
    Ok(Json(DataResponse {
        data: ClearLogsResult { deleted },
    }))
}

/// ANY /api/v1/journals/{journal_id}/admin[/...]
///
/// Site administration is never available inside a journal.
pub async fn refuse_in_context(RequireSiteAdmin(_admin): RequireSiteAdmin) -> AppError {
    AppError::Core(CoreError::Forbidden(
        "Site administration is not available inside a journal".into(),
    ))
}
