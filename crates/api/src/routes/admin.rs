//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `site_admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /                          -> index
/// GET    /contexts                  -> contexts
/// POST   /contexts                  -> create_context
/// GET    /settings                  -> settings
/// GET    /wizard/{id}               -> wizard
/// GET    /system-info               -> system_info
/// POST   /expire-sessions           -> expire_sessions
/// GET    /scheduled-tasks           -> scheduled_tasks
/// DELETE /scheduled-task-logs       -> clear_scheduled_task_log_files
/// GET    /scheduled-task-logs/{file} -> download_scheduled_task_log_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route(
            "/contexts",
            get(admin::contexts).post(admin::create_context),
        )
        .route("/settings", get(admin::settings))
        .route("/wizard/{id}", get(admin::wizard))
        .route("/system-info", get(admin::system_info))
        .route("/expire-sessions", post(admin::expire_sessions))
        .route("/scheduled-tasks", get(admin::scheduled_tasks))
        .route(
            "/scheduled-task-logs",
            axum::routing::delete(admin::clear_scheduled_task_log_files),
        )
        .route(
            "/scheduled-task-logs/{file}",
            get(admin::download_scheduled_task_log_file),
        )
}
