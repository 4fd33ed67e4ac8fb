//! Handlers for journal payments: `/journals/{journal_id}/payments`.
//!
//! Each request builds a [`PaymentManager`] for the journal, backed by the
//! PostgreSQL store and the site's payment plugin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;
use scholar_core::context::Context;
use scholar_core::error::CoreError;
use scholar_core::payment::plugin::{ConfigurationForm, PaymentForm};
use scholar_core::payment::{CompletedPayment, OneIn, PaymentManager, QueuedPayment};
use scholar_core::types::DbId;
use scholar_db::repositories::{CompletedPaymentRepo, PgPaymentStore};

use crate::error::{AppError, AppResult};
use crate::handlers::journals::load_journal;
use crate::middleware::rbac::RequireManager;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for completed payments.
const DEFAULT_COMPLETED_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /journals/{journal_id}/payments/queue`.
#[derive(Debug, Deserialize, Validate)]
pub struct QueuePaymentRequest {
    #[validate(range(min = 0.0))]
    pub amount: f64,
    /// Defaults to the journal's currency.
    #[validate(length(equal = 3))]
    pub currency_code: Option<String>,
    pub payment_type: i32,
    pub user_id: Option<DbId>,
    pub assoc_id: Option<DbId>,
    #[validate(length(min = 1, max = 2048))]
    pub request_url: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct FulfillResult {
    pub fulfilled: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn payment_manager(state: &AppState, journal: Context) -> PaymentManager<PgPaymentStore> {
    PaymentManager::new(
        journal,
        state.payment_plugin.clone(),
        PgPaymentStore::new(state.pool.clone()),
    )
    .with_cleanup_trigger(OneIn(state.config.payments.cleanup_odds))
}

fn not_configured() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Payments are not configured for this journal".into(),
    ))
}

/// A queued payment of this journal, or 404.
async fn journal_queued_payment(
    manager: &PaymentManager<PgPaymentStore>,
    id: DbId,
) -> AppResult<QueuedPayment> {
    manager
        .queued_payment(id)
        .await?
        .filter(|queued| queued.payment.context_id == manager.context().id)
        .ok_or(AppError::not_found("QueuedPayment", id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/journals/{journal_id}/payments/queue
///
/// Queue a payment. Answers 409 when the journal cannot take payments.
pub async fn queue_payment(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Json(input): Json<QueuePaymentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<QueuedPayment>>)> {
    input.validate()?;
    let journal = load_journal(&state.pool, journal_id).await?;

    let currency = input
        .currency_code
        .or_else(|| journal.currency.clone())
        .ok_or_else(|| {
            AppError::BadRequest("currency_code is required: the journal has no currency".into())
        })?;

    let mut queued = QueuedPayment::new(
        input.amount,
        currency.to_ascii_uppercase(),
        input.user_id,
        input.assoc_id,
    );
    queued.payment.context_id = journal_id;
    queued.payment.payment_type = input.payment_type;
    if let Some(url) = input.request_url {
        queued.set_request_url(url);
    }

    let manager = payment_manager(&state, journal);
    let id = manager
        .queue_payment(&queued, input.expiry_date)
        .await?
        .ok_or_else(not_configured)?;
    queued.payment.id = Some(id);

    Ok((StatusCode::CREATED, Json(DataResponse { data: queued })))
}

/// GET /api/v1/journals/{journal_id}/payments/queued/{id}
pub async fn get_queued_payment(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<QueuedPayment>>> {
    let journal = load_journal(&state.pool, journal_id).await?;
    let manager = payment_manager(&state, journal);
    let queued = journal_queued_payment(&manager, id).await?;
    Ok(Json(DataResponse { data: queued }))
}

/// GET /api/v1/journals/{journal_id}/payments/queued/{id}/form
///
/// The plugin's payment form for a queued payment.
pub async fn payment_form(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<PaymentForm>>> {
    let journal = load_journal(&state.pool, journal_id).await?;
    let manager = payment_manager(&state, journal);
    let queued = journal_queued_payment(&manager, id).await?;
    let form = manager.payment_form(&queued).ok_or_else(not_configured)?;
    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/journals/{journal_id}/payments/configuration
pub async fn configuration_form(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ConfigurationForm>>> {
    let journal = load_journal(&state.pool, journal_id).await?;
    let form = payment_manager(&state, journal)
        .display_configuration_form()
        .ok_or_else(not_configured)?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/journals/{journal_id}/payments/queued/{id}/fulfill
///
/// Mark a queued payment as received. `fulfilled` is false when another
/// request completed it first.
pub async fn fulfill_queued_payment(
    RequireManager(manager_user): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<FulfillResult>>> {
    let journal = load_journal(&state.pool, journal_id).await?;
    let manager = payment_manager(&state, journal);
    let queued = journal_queued_payment(&manager, id).await?;

    let plugin_name = manager.payment_plugin().map(|plugin| plugin.name().to_string());
    let fulfilled = manager
        .fulfill_queued_payment(&queued, plugin_name.as_deref())
        .await?;
    tracing::info!(
        journal_id,
        queued_payment_id = id,
        fulfilled,
        user_id = manager_user.user_id,
        "Queued payment fulfilment requested"
    );
    Ok(Json(DataResponse {
        data: FulfillResult { fulfilled },
    }))
}

/// GET /api/v1/journals/{journal_id}/payments/completed
pub async fn list_completed_payments(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<CompletedPayment>>>> {
    load_journal(&state.pool, journal_id).await?;
    let payments = CompletedPaymentRepo::list_by_context(
        &state.pool,
        journal_id,
        params.limit_or(DEFAULT_COMPLETED_LIMIT),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: payments }))
}
