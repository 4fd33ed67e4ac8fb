use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use scholar_core::version::Version;
use scholar_db::repositories::VersionRepo;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    /// Version of the running code.
    pub version: String,
    /// Version recorded in the database, if installed.
    pub installed_version: Option<String>,
    /// The running code is newer than the installed schema.
    pub upgrade_pending: bool,
    pub db_healthy: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = scholar_db::health_check(&state.pool).await.is_ok();
    let installed = if db_healthy {
        VersionRepo::current(&state.pool)
            .await
            .ok()
            .flatten()
            .map(|row| row.version())
    } else {
        None
    };

    let code = Version::code_version();
    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: code.to_string(),
        installed_version: installed.map(|v| v.to_string()),
        upgrade_pending: installed.is_some_and(|v| v < code),
        db_healthy,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
