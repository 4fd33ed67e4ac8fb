//! Handlers for journal announcements and announcement types.
//!
//! Announcements and types are attached to the journal in the URL; the
//! association is never taken from the request body.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;
use scholar_core::assoc::AssocType;
use scholar_core::types::DbId;
use scholar_db::models::announcement::{
    AnnouncementTypeWithSettings, AnnouncementWithSettings, CreateAnnouncement,
    CreateAnnouncementType, LocalizedText, UpdateAnnouncement,
};
use scholar_db::repositories::{AnnouncementRepo, AnnouncementTypeRepo};
use scholar_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::journals::load_journal;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Announcements of a journal are stored against the journal assoc type.
const JOURNAL_ASSOC: i16 = AssocType::Journal.code() as i16;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /announcements`.
#[derive(Debug, Deserialize)]
pub struct ListAnnouncementsQuery {
    /// Leave out expired announcements (default `false`).
    #[serde(default)]
    pub active_only: bool,
    pub limit: Option<i64>,
}

/// Request body for `POST /announcements`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    pub type_id: Option<DbId>,
    pub date_expire: Option<NaiveDate>,
    /// Locale -> title; at least one locale.
    #[validate(length(min = 1))]
    pub title: LocalizedText,
    #[serde(default)]
    pub description_short: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
}

/// Request body for `POST /announcement-types`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnnouncementTypeRequest {
    /// Locale -> name; at least one locale.
    #[validate(length(min = 1))]
    pub name: LocalizedText,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_announcement(
    pool: &DbPool,
    journal_id: DbId,
    id: DbId,
) -> AppResult<AnnouncementWithSettings> {
    AnnouncementRepo::find_by_id(pool, id)
        .await?
        .filter(|a| {
            a.announcement.assoc_type == Some(JOURNAL_ASSOC)
                && a.announcement.assoc_id == journal_id
        })
        .ok_or(AppError::not_found("Announcement", id))
}

async fn find_type(
    pool: &DbPool,
    journal_id: DbId,
    id: DbId,
) -> AppResult<Option<AnnouncementTypeWithSettings>> {
    Ok(AnnouncementTypeRepo::find_by_id(pool, id).await?.filter(|t| {
        t.announcement_type.assoc_type == JOURNAL_ASSOC
            && t.announcement_type.assoc_id == journal_id
    }))
}

/// Reject a type that belongs to another journal.
async fn ensure_type_in_journal(
    pool: &DbPool,
    journal_id: DbId,
    type_id: Option<DbId>,
) -> AppResult<()> {
    let Some(type_id) = type_id else {
        return Ok(());
    };
    match find_type(pool, journal_id, type_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(format!(
            "Announcement type {type_id} does not belong to this journal"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Announcements
// ---------------------------------------------------------------------------

/// GET /api/v1/journals/{journal_id}/announcements
pub async fn list(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Query(params): Query<ListAnnouncementsQuery>,
) -> AppResult<Json<DataResponse<Vec<AnnouncementWithSettings>>>> {
    load_journal(&state.pool, journal_id).await?;
    let announcements = AnnouncementRepo::list_by_assoc(
        &state.pool,
        JOURNAL_ASSOC,
        journal_id,
        params.active_only,
        params.limit,
    )
    .await?;
    Ok(Json(DataResponse {
        data: announcements,
    }))
}

/// POST /api/v1/journals/{journal_id}/announcements
pub async fn create(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Json(input): Json<CreateAnnouncementRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AnnouncementWithSettings>>)> {
    input.validate()?;
    load_journal(&state.pool, journal_id).await?;
    ensure_type_in_journal(&state.pool, journal_id, input.type_id).await?;

    let announcement = AnnouncementRepo::create(
        &state.pool,
        &CreateAnnouncement {
            assoc_type: Some(JOURNAL_ASSOC),
            assoc_id: journal_id,
            type_id: input.type_id,
            date_expire: input.date_expire,
            title: input.title,
            description_short: input.description_short,
            description: input.description,
        },
    )
    .await?;
    tracing::info!(
        journal_id,
        announcement_id = announcement.announcement.id,
        "Announcement posted"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: announcement }),
    ))
}

/// GET /api/v1/journals/{journal_id}/announcements/{id}
pub async fn get_by_id(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<AnnouncementWithSettings>>> {
    let announcement = find_announcement(&state.pool, journal_id, id).await?;
    Ok(Json(DataResponse { data: announcement }))
}

/// PUT /api/v1/journals/{journal_id}/announcements/{id}
pub async fn update(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateAnnouncement>,
) -> AppResult<Json<DataResponse<AnnouncementWithSettings>>> {
    find_announcement(&state.pool, journal_id, id).await?;
    ensure_type_in_journal(&state.pool, journal_id, input.type_id).await?;

    let announcement = AnnouncementRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Announcement", id))?;
    Ok(Json(DataResponse { data: announcement }))
}

/// DELETE /api/v1/journals/{journal_id}/announcements/{id}
pub async fn delete(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_announcement(&state.pool, journal_id, id).await?;
    AnnouncementRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Announcement types
// ---------------------------------------------------------------------------

/// GET /api/v1/journals/{journal_id}/announcement-types
pub async fn list_types(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AnnouncementTypeWithSettings>>>> {
    load_journal(&state.pool, journal_id).await?;
    let types = AnnouncementTypeRepo::list_by_assoc(&state.pool, JOURNAL_ASSOC, journal_id).await?;
    Ok(Json(DataResponse { data: types }))
}

/// POST /api/v1/journals/{journal_id}/announcement-types
pub async fn create_type(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Json(input): Json<CreateAnnouncementTypeRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AnnouncementTypeWithSettings>>)> {
    input.validate()?;
    load_journal(&state.pool, journal_id).await?;

    let announcement_type = AnnouncementTypeRepo::create(
        &state.pool,
        &CreateAnnouncementType {
            assoc_type: JOURNAL_ASSOC,
            assoc_id: journal_id,
            name: input.name,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: announcement_type,
        }),
    ))
}

/// DELETE /api/v1/journals/{journal_id}/announcement-types/{id}
///
/// Announcements of the type are deleted with it.
pub async fn delete_type(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_type(&state.pool, journal_id, id)
        .await?
        .ok_or(AppError::not_found("AnnouncementType", id))?;
    AnnouncementTypeRepo::delete(&state.pool, id).await?;
    tracing::info!(journal_id, type_id = id, "Announcement type deleted");
    Ok(StatusCode::NO_CONTENT)
}
