//! Handlers for submission agencies and their controlled vocabulary entries.
//!
//! ```text
//! /journals/{journal_id}/publications/{id}/agencies
//! /journals/{journal_id}/controlled-vocabs/{vocab_id}/entries[/{id}]
//! ```

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use scholar_core::assoc::AssocType;
use scholar_core::controlled_vocab::{ResultRange, SubmissionAgency};
use scholar_core::types::DbId;
use scholar_db::models::controlled_vocab::{CreateEntry, EntryPage};
use scholar_db::repositories::SubmissionAgencyEntryRepo;
use scholar_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::journals::load_journal;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Locale -> agency names, in entry order.
pub type AgenciesByLocale = BTreeMap<String, Vec<String>>;

/// `?count=&page=` for entry listings. Without `count` every entry is returned.
#[derive(Debug, Deserialize, Validate)]
pub struct RangeParams {
    #[validate(range(min = 1))]
    pub count: Option<i64>,
    /// Capped at [`MAX_RANGE_PAGE`](scholar_core::controlled_vocab::MAX_RANGE_PAGE).
    #[validate(range(min = 1, max = 1000000))]
    pub page: Option<i64>,
}

impl RangeParams {
    fn range(&self) -> Option<ResultRange> {
        self.count
            .map(|count| ResultRange::new(count, self.page.unwrap_or(1)))
    }
}

/// Request body for creating or updating an entry.
#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    pub seq: Option<f64>,
    /// Locale -> agency name.
    #[validate(length(min = 1))]
    pub values: BTreeMap<String, String>,
}

async fn find_entry(pool: &DbPool, vocab_id: DbId, id: DbId) -> AppResult<SubmissionAgency> {
    SubmissionAgencyEntryRepo::find_by_id(pool, id)
        .await?
        .filter(|entry| entry.controlled_vocab_id == vocab_id)
        .ok_or(AppError::not_found("SubmissionAgency", id))
}

/// GET /api/v1/journals/{journal_id}/publications/{id}/agencies
pub async fn get_agencies(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, publication_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<AgenciesByLocale>>> {
    load_journal(&state.pool, journal_id).await?;
    let agencies = SubmissionAgencyEntryRepo::agencies(
        &state.pool,
        AssocType::Publication.code(),
        publication_id,
    )
    .await?;
    Ok(Json(DataResponse { data: agencies }))
}

/// PUT /api/v1/journals/{journal_id}/publications/{id}/agencies
///
/// Replace every agency of the publication. Terms are trimmed and
/// de-duplicated per locale.
pub async fn replace_agencies(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, publication_id)): Path<(DbId, DbId)>,
    Json(agencies): Json<AgenciesByLocale>,
) -> AppResult<Json<DataResponse<AgenciesByLocale>>> {
    load_journal(&state.pool, journal_id).await?;
    let stored = SubmissionAgencyEntryRepo::replace_agencies(
        &state.pool,
        AssocType::Publication.code(),
        publication_id,
        &agencies,
    )
    .await?;
    tracing::info!(journal_id, publication_id, "Submission agencies replaced");
    Ok(Json(DataResponse { data: stored }))
}

/// GET /api/v1/journals/{journal_id}/controlled-vocabs/{vocab_id}/entries
///
/// Entries ordered by `seq`, optionally one page of them, with the total.
pub async fn list_entries(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, vocab_id)): Path<(DbId, DbId)>,
    Query(params): Query<RangeParams>,
) -> AppResult<Json<DataResponse<EntryPage>>> {
    params.validate()?;
    load_journal(&state.pool, journal_id).await?;
    let page =
        SubmissionAgencyEntryRepo::get_by_controlled_vocab_id(&state.pool, vocab_id, params.range())
            .await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/journals/{journal_id}/controlled-vocabs/{vocab_id}/entries
pub async fn create_entry(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, vocab_id)): Path<(DbId, DbId)>,
    Json(input): Json<EntryRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SubmissionAgency>>)> {
    input.validate()?;
    load_journal(&state.pool, journal_id).await?;
    let entry = SubmissionAgencyEntryRepo::insert(
        &state.pool,
        vocab_id,
        &CreateEntry {
            seq: input.seq,
            values: input.values,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// PUT /api/v1/journals/{journal_id}/controlled-vocabs/{vocab_id}/entries/{id}
pub async fn update_entry(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, vocab_id, id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<EntryRequest>,
) -> AppResult<Json<DataResponse<SubmissionAgency>>> {
    input.validate()?;
    load_journal(&state.pool, journal_id).await?;
    find_entry(&state.pool, vocab_id, id).await?;

    let entry = SubmissionAgencyEntryRepo::update_values(&state.pool, id, &input.values)
        .await?
        .ok_or(AppError::not_found("SubmissionAgency", id))?;
    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /api/v1/journals/{journal_id}/controlled-vocabs/{vocab_id}/entries/{id}
pub async fn delete_entry(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, vocab_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_journal(&state.pool, journal_id).await?;
    find_entry(&state.pool, vocab_id, id).await?;
    SubmissionAgencyEntryRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
