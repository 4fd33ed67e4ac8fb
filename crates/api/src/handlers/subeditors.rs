//! Handlers for subeditor assignments to sections and categories.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use scholar_core::types::DbId;
use scholar_db::models::subeditor::{AssignSubeditor, SubeditorAssignment, SubmissionGroup};
use scholar_db::repositories::SubeditorRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::journals::load_journal;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

fn parse_group(slug: &str) -> AppResult<SubmissionGroup> {
    SubmissionGroup::from_slug(slug)
        .ok_or_else(|| AppError::NotFound(format!("Unknown submission group '{slug}'")))
}

/// POST /api/v1/journals/{journal_id}/subeditors
///
/// Answers 201 for a new assignment and 200 if it already existed.
pub async fn assign(
    RequireManager(manager_user): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Json(input): Json<AssignSubeditor>,
) -> AppResult<(StatusCode, Json<DataResponse<SubeditorAssignment>>)> {
    load_journal(&state.pool, journal_id).await?;
    let assoc_type = input.group.assoc_type().code();

    let created = SubeditorRepo::assign(
        &state.pool,
        journal_id,
        assoc_type,
        input.assoc_id,
        input.user_id,
    )
    .await?;
    if created {
        tracing::info!(
            journal_id,
            group = ?input.group,
            assoc_id = input.assoc_id,
            user_id = input.user_id,
            manager_id = manager_user.user_id,
            "Subeditor assigned"
        );
    }

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(DataResponse {
            data: SubeditorAssignment {
                context_id: journal_id,
                assoc_type,
                assoc_id: input.assoc_id,
                user_id: input.user_id,
            },
        }),
    ))
}

/// GET /api/v1/journals/{journal_id}/subeditors/{group}/{assoc_id}
pub async fn list_by_group(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, group, assoc_id)): Path<(DbId, String, DbId)>,
) -> AppResult<Json<DataResponse<Vec<SubeditorAssignment>>>> {
    let group = parse_group(&group)?;
    load_journal(&state.pool, journal_id).await?;
    let assignments = SubeditorRepo::list_by_group(
        &state.pool,
        journal_id,
        group.assoc_type().code(),
        assoc_id,
    )
    .await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// DELETE /api/v1/journals/{journal_id}/subeditors/{group}/{assoc_id}/{user_id}
pub async fn remove(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, group, assoc_id, user_id)): Path<(DbId, String, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let group = parse_group(&group)?;
    let removed = SubeditorRepo::remove(
        &state.pool,
        journal_id,
        group.assoc_type().code(),
        assoc_id,
        user_id,
    )
    .await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "User {user_id} is not a subeditor of {group:?} {assoc_id}"
        )))
    }
}

/// GET /api/v1/journals/{journal_id}/users/{user_id}/subeditor-groups
pub async fn list_by_user(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<SubeditorAssignment>>>> {
    load_journal(&state.pool, journal_id).await?;
    let assignments = SubeditorRepo::list_by_user(&state.pool, journal_id, user_id).await?;
    Ok(Json(DataResponse { data: assignments }))
}
