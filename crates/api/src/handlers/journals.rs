//! Journal lookup shared by journal-scoped handlers, and journal settings.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use scholar_core::context::Context;
use scholar_core::types::DbId;
use scholar_db::models::journal::{
    SETTING_CURRENCY, SETTING_PAYMENTS_ENABLED, SETTING_SUPPORTED_FORM_LOCALES,
};
use scholar_db::repositories::JournalRepo;
use scholar_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a journal or fail with 404.
pub(crate) async fn load_journal(pool: &DbPool, journal_id: DbId) -> AppResult<Context> {
    JournalRepo::find_by_id(pool, journal_id)
        .await?
        .ok_or(AppError::not_found("Journal", journal_id))
}

/// Request body for `PUT /journals/{journal_id}/settings`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJournalSettings {
    pub payments_enabled: Option<bool>,
    /// ISO 4217 alpha code.
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[validate(length(min = 1))]
    pub supported_form_locales: Option<Vec<String>>,
}

/// PUT /api/v1/journals/{journal_id}/settings
pub async fn update_settings(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Json(input): Json<UpdateJournalSettings>,
) -> AppResult<Json<DataResponse<Context>>> {
    input.validate()?;
    load_journal(&state.pool, journal_id).await?;

    if let Some(enabled) = input.payments_enabled {
        let value = if enabled { "1" } else { "0" };
        JournalRepo::set_setting(&state.pool, journal_id, SETTING_PAYMENTS_ENABLED, value).await?;
    }
    if let Some(currency) = &input.currency {
        JournalRepo::set_setting(
            &state.pool,
            journal_id,
            SETTING_CURRENCY,
            &currency.to_ascii_uppercase(),
        )
        .await?;
    }
    if let Some(locales) = &input.supported_form_locales {
        let json = serde_json::to_string(locales)
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        JournalRepo::set_setting(&state.pool, journal_id, SETTING_SUPPORTED_FORM_LOCALES, &json)
            .await?;
    }

    let journal = load_journal(&state.pool, journal_id).await?;
    tracing::info!(journal_id, "Journal settings updated");
    Ok(Json(DataResponse { data: journal }))
}
