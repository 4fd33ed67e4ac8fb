//! Handlers for data object tombstones.
//!
//! Listing is public so OAI harvesters can learn about deletions; recording
//! and removing tombstones is done by journal managers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use scholar_core::assoc::AssocType;
use scholar_core::tombstone::DataObjectTombstone;
use scholar_core::types::{DbId, Timestamp};
use scholar_db::repositories::TombstoneRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::journals::load_journal;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /tombstones`.
#[derive(Debug, Deserialize)]
pub struct HarvestQuery {
    /// Restrict to a set and its subsets.
    pub set_spec: Option<String>,
    pub from: Option<Timestamp>,
    pub until: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /journals/{journal_id}/tombstones`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTombstoneRequest {
    pub data_object_id: DbId,
    #[validate(length(min = 1, max = 255))]
    pub set_spec: String,
    #[validate(length(min = 1, max = 255))]
    pub set_name: String,
    #[validate(length(min = 1, max = 255))]
    pub oai_identifier: String,
    pub section_id: Option<DbId>,
}

/// GET /api/v1/tombstones
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HarvestQuery>,
) -> AppResult<Json<DataResponse<Vec<DataObjectTombstone>>>> {
    if let (Some(from), Some(until)) = (params.from, params.until) {
        if from > until {
            return Err(AppError::BadRequest("`from` is later than `until`".into()));
        }
    }
    let tombstones = TombstoneRepo::list_for_harvest(
        &state.pool,
        params.set_spec.as_deref(),
        params.from,
        params.until,
        params.limit.unwrap_or(100),
        params.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: tombstones }))
}

/// GET /api/v1/tombstones/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DataObjectTombstone>>> {
    let tombstone = TombstoneRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("DataObjectTombstone", id))?;
    Ok(Json(DataResponse { data: tombstone }))
}

/// POST /api/v1/journals/{journal_id}/tombstones
///
/// Record a deleted object. The journal (and the section, when given) are
/// stored as the object's set objects. An earlier tombstone of the same
/// object is replaced.
pub async fn create(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Json(input): Json<CreateTombstoneRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DataObjectTombstone>>)> {
    input.validate()?;
    load_journal(&state.pool, journal_id).await?;

    let mut tombstone = DataObjectTombstone::new(
        input.data_object_id,
        input.set_spec,
        input.set_name,
        input.oai_identifier,
    );
    tombstone.stamp_date_deleted();
    tombstone.set_oai_set_object_id(AssocType::Journal, journal_id);
    if let Some(section_id) = input.section_id {
        tombstone.set_oai_set_object_id(AssocType::Section, section_id);
    }

    let replaced = TombstoneRepo::delete_by_data_object_id(&state.pool, input.data_object_id).await?;
    let stored = TombstoneRepo::insert(&state.pool, &tombstone).await?;
    tracing::info!(
        journal_id,
        data_object_id = stored.data_object_id,
        replaced,
        "Tombstone recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: stored })))
}

/// DELETE /api/v1/journals/{journal_id}/tombstones/{id}
///
/// Remove the tombstone of a restored object.
pub async fn delete(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let in_journal = TombstoneRepo::find_by_id(&state.pool, id)
        .await?
        .is_some_and(|t| t.oai_set_object_id(AssocType::Journal) == Some(journal_id));
    if !in_journal {
        return Err(AppError::not_found("DataObjectTombstone", id));
    }
    TombstoneRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
