//! Handlers for the public identifiers form:
//! `/journals/{journal_id}/pub-ids/{kind}/{id}`.
//!
//! `kind` is the URL slug of a [`PubObjectKind`] (`submission`,
//! `publication`, `representation`, `submission-file`, `issue`, `chapter`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use scholar_core::pub_ids::{
    PubIdsFormView, PubIdsInput, PubObject, PubObjectKind, PublicIdentifiersForm,
};
use scholar_core::types::DbId;
use scholar_db::repositories::{is_duplicate_pub_id, PgPubIdRegistry, PubIdRepo};
use scholar_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::journals::load_journal;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /pub-ids/{kind}/{id}`.
#[derive(Debug, Deserialize)]
pub struct PubIdsQuery {
    pub stage_id: Option<i32>,
    pub submission_id: Option<DbId>,
}

/// Request body for `PUT /pub-ids/{kind}/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdatePubIdsRequest {
    pub publisher_id: Option<String>,
    pub stage_id: Option<i32>,
    pub submission_id: Option<DbId>,
    /// Opaque parameters echoed back in the form view.
    pub form_params: Option<serde_json::Value>,
}

fn parse_kind(slug: &str) -> AppResult<PubObjectKind> {
    PubObjectKind::from_slug(slug)
        .ok_or_else(|| AppError::NotFound(format!("Unknown object kind '{slug}'")))
}

/// The object with the identifiers the journal holds for it.
///
/// An object whose identifiers belong to another journal is not found.
async fn load_pub_object(
    pool: &DbPool,
    journal_id: DbId,
    kind: PubObjectKind,
    id: DbId,
    submission_id: Option<DbId>,
) -> AppResult<PubObject> {
    let owners = PubIdRepo::owner_contexts(pool, kind.assoc_type(), id).await?;
    if owners.iter().any(|owner| *owner != journal_id) {
        return Err(AppError::NotFound(format!(
            "{kind:?} {id} does not belong to this journal"
        )));
    }

    let mut object = PubObject::new(kind, id);
    object.submission_id = submission_id;
    object.stored_pub_ids =
        PubIdRepo::stored_pub_ids(pool, journal_id, kind.assoc_type(), id).await?;
    Ok(object)
}

/// GET /api/v1/journals/{journal_id}/pub-ids/{kind}/{id}
///
/// The form initialised from the stored identifiers.
pub async fn get_form(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, kind, id)): Path<(DbId, String, DbId)>,
    Query(params): Query<PubIdsQuery>,
) -> AppResult<Json<DataResponse<PubIdsFormView>>> {
    let kind = parse_kind(&kind)?;
    load_journal(&state.pool, journal_id).await?;

    let object = load_pub_object(&state.pool, journal_id, kind, id, params.submission_id).await?;
    let mut form = PublicIdentifiersForm::new(journal_id, object, params.stage_id, None);
    form.init_data();
    Ok(Json(DataResponse { data: form.view() }))
}

/// PUT /api/v1/journals/{journal_id}/pub-ids/{kind}/{id}
///
/// Validate and store the publisher id. Field errors answer 422; an empty
/// publisher id removes the stored one.
pub async fn update(
    RequireManager(manager_user): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, kind, id)): Path<(DbId, String, DbId)>,
    Json(input): Json<UpdatePubIdsRequest>,
) -> AppResult<Json<DataResponse<PubIdsFormView>>> {
    let kind = parse_kind(&kind)?;
    load_journal(&state.pool, journal_id).await?;

    let object = load_pub_object(&state.pool, journal_id, kind, id, input.submission_id).await?;
    let mut form =
        PublicIdentifiersForm::new(journal_id, object, input.stage_id, input.form_params);
    form.read_input(PubIdsInput {
        publisher_id: input.publisher_id,
    });

    let registry = PgPubIdRegistry::new(state.pool.clone());
    if !form.validate(&registry).await? {
        return Err(AppError::Form(form.errors().clone()));
    }

    let object = form.execute();
    match PubIdRepo::save_object(&state.pool, journal_id, object).await {
        Ok(()) => {}
        Err(e) if is_duplicate_pub_id(&e) => {
            return Err(AppError::Form(form.reject_taken_publisher_id().clone()));
        }
        Err(e) => return Err(e.into()),
    }
    tracing::info!(
        journal_id,
        kind = ?kind,
        object_id = id,
        user_id = manager_user.user_id,
        "Public identifiers saved"
    );
    Ok(Json(DataResponse { data: form.view() }))
}

/// DELETE /api/v1/journals/{journal_id}/pub-ids/{kind}/{id}/{pub_id_type}
pub async fn clear(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, kind, id, pub_id_type)): Path<(DbId, String, DbId, String)>,
) -> AppResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    load_journal(&state.pool, journal_id).await?;

    let object = load_pub_object(&state.pool, journal_id, kind, id, None).await?;
    let mut form = PublicIdentifiersForm::new(journal_id, object, None, None);
    form.init_data();
    let object = form.clear_pub_id(&pub_id_type);
    PubIdRepo::save_object(&state.pool, journal_id, object).await?;
    Ok(StatusCode::NO_CONTENT)
}
