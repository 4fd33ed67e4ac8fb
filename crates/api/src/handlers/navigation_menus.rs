//! Handlers for navigation menus and menu items of a journal.
//!
//! ```text
//! /journals/{journal_id}/navigation-menus[/{id}]
//! /journals/{journal_id}/navigation-menus/{id}/assignments
//! /journals/{journal_id}/navigation-menus/grid
//! /journals/{journal_id}/navigation-menu-items[/{id}]
//! ```

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;
use scholar_core::error::CoreError;
use scholar_core::navigation_menu::{
    find_parent_cycle, ItemAssignment, NavigationMenu, NavigationMenuItem,
};
use scholar_core::navigation_menu_grid::{
    CellTemplateVars, GridColumn, LinkAction, NavigationMenusGridCellProvider,
};
use scholar_core::types::DbId;
use scholar_db::models::navigation_menu::{
    AssignItem, CreateNavigationMenu, CreateNavigationMenuItem, UpdateNavigationMenu,
};
use scholar_db::repositories::{NavigationMenuItemRepo, NavigationMenuRepo};
use scholar_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::journals::load_journal;
use crate::middleware::rbac::RequireManager;
use crate::query::LocaleParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Columns of the management grid, in display order.
const GRID_COLUMNS: [&str; 2] = ["title", "nmis"];

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /navigation-menus`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMenuRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 255))]
    pub area_name: Option<String>,
}

/// Request body for `PUT /navigation-menus/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMenuRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub area_name: Option<String>,
}

/// Request body for `POST /navigation-menu-items`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub item_type: String,
    #[validate(length(max = 255))]
    pub path: Option<String>,
    #[serde(default)]
    pub titles: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct GridCell {
    pub column: String,
    pub template_vars: CellTemplateVars,
    pub actions: Vec<LinkAction>,
}

#[derive(Debug, Serialize)]
pub struct GridRow {
    pub id: DbId,
    pub cells: Vec<GridCell>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_menu(pool: &DbPool, journal_id: DbId, id: DbId) -> AppResult<NavigationMenu> {
    NavigationMenuRepo::find_by_id(pool, journal_id, id)
        .await?
        .ok_or(AppError::not_found("NavigationMenu", id))
}

/// A journal has at most one menu per navigation area.
async fn ensure_area_free(
    pool: &DbPool,
    journal_id: DbId,
    area_name: Option<&str>,
    menu_id: Option<DbId>,
) -> AppResult<()> {
    let Some(area) = area_name.filter(|a| !a.is_empty()) else {
        return Ok(());
    };
    match NavigationMenuRepo::find_by_area(pool, journal_id, area).await? {
        Some(existing) if Some(existing.id) != menu_id => Err(AppError::Core(
            CoreError::Conflict(format!("Area '{area}' already holds menu {}", existing.id)),
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Menus
// ---------------------------------------------------------------------------

/// GET /api/v1/journals/{journal_id}/navigation-menus
pub async fn list_menus(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<NavigationMenu>>>> {
    load_journal(&state.pool, journal_id).await?;
    let menus = NavigationMenuRepo::list_by_context(&state.pool, journal_id).await?;
    Ok(Json(DataResponse { data: menus }))
}

/// POST /api/v1/journals/{journal_id}/navigation-menus
pub async fn create_menu(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Json(input): Json<CreateMenuRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<NavigationMenu>>)> {
    input.validate()?;
    load_journal(&state.pool, journal_id).await?;
    ensure_area_free(&state.pool, journal_id, input.area_name.as_deref(), None).await?;

    let menu = NavigationMenuRepo::create(
        &state.pool,
        journal_id,
        &CreateNavigationMenu {
            title: input.title,
            area_name: input.area_name,
        },
    )
    .await?;
    tracing::info!(journal_id, menu_id = menu.id, "Navigation menu created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: menu })))
}

/// GET /api/v1/journals/{journal_id}/navigation-menus/{id}
///
/// The menu with its item tree.
pub async fn get_menu(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<NavigationMenu>>> {
    let mut menu = find_menu(&state.pool, journal_id, id).await?;
    NavigationMenuRepo::load_tree(&state.pool, &mut menu).await?;
    Ok(Json(DataResponse { data: menu }))
}

/// PUT /api/v1/journals/{journal_id}/navigation-menus/{id}
pub async fn update_menu(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateMenuRequest>,
) -> AppResult<Json<DataResponse<NavigationMenu>>> {
    input.validate()?;
    ensure_area_free(&state.pool, journal_id, input.area_name.as_deref(), Some(id)).await?;

    let menu = NavigationMenuRepo::update(
        &state.pool,
        journal_id,
        id,
        &UpdateNavigationMenu {
            title: input.title,
            area_name: input.area_name,
        },
    )
    .await?
    .ok_or(AppError::not_found("NavigationMenu", id))?;
    Ok(Json(DataResponse { data: menu }))
}

/// DELETE /api/v1/journals/{journal_id}/navigation-menus/{id}
pub async fn delete_menu(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if NavigationMenuRepo::delete(&state.pool, journal_id, id).await? {
        tracing::info!(journal_id, menu_id = id, "Navigation menu deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("NavigationMenu", id))
    }
}

/// PUT /api/v1/journals/{journal_id}/navigation-menus/{id}/assignments
///
/// Replace the menu's items. Every item must belong to the journal and
/// parent links may not form a cycle.
pub async fn replace_assignments(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
    Json(items): Json<Vec<AssignItem>>,
) -> AppResult<Json<DataResponse<NavigationMenu>>> {
    let mut menu = find_menu(&state.pool, journal_id, id).await?;

    let known: HashSet<DbId> = NavigationMenuItemRepo::list_by_context(&state.pool, journal_id)
        .await?
        .iter()
        .map(|item| item.id)
        .collect();
    if let Some(unknown) = items.iter().find(|a| !known.contains(&a.item_id)) {
        return Err(AppError::BadRequest(format!(
            "Navigation menu item {} does not belong to this journal",
            unknown.item_id
        )));
    }

    let placements: Vec<ItemAssignment> = items
        .iter()
        .map(|a| ItemAssignment {
            item_id: a.item_id,
            parent_id: a.parent_id,
            seq: a.seq,
        })
        .collect();
    if let Some(item_id) = find_parent_cycle(&placements) {
        return Err(AppError::BadRequest(format!(
            "Navigation menu item {item_id} is its own ancestor"
        )));
    }

    NavigationMenuRepo::replace_assignments(&state.pool, id, &items).await?;
    NavigationMenuRepo::load_tree(&state.pool, &mut menu).await?;
    tracing::info!(journal_id, menu_id = id, items = items.len(), "Menu items assigned");
    Ok(Json(DataResponse { data: menu }))
}

/// GET /api/v1/journals/{journal_id}/navigation-menus/grid?locale=
///
/// One row per menu with the cells of the management grid. Item titles
/// use `locale`, falling back to the journal's primary locale.
pub async fn grid(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Query(params): Query<LocaleParams>,
) -> AppResult<Json<DataResponse<Vec<GridRow>>>> {
    let journal = load_journal(&state.pool, journal_id).await?;
    let locale = params
        .locale
        .unwrap_or_else(|| journal.primary_locale.clone());

    let provider = NavigationMenusGridCellProvider::new(format!(
        "{}/api/v1/journals/{journal_id}/navigation-menus/grid",
        state.config.base_url.trim_end_matches('/')
    ));
    let columns: Vec<GridColumn> = GRID_COLUMNS.iter().map(|id| GridColumn::from_id(id)).collect();

    let menus = NavigationMenuRepo::list_by_context(&state.pool, journal_id).await?;
    let mut rows = Vec::with_capacity(menus.len());
    for menu in &menus {
        let items = NavigationMenuRepo::assigned_items(&state.pool, menu.id).await?;
        let cells = columns
            .iter()
            .map(|column| GridCell {
                column: column.id().to_string(),
                template_vars: provider.template_vars(
                    column,
                    &items,
                    &locale,
                    &journal.primary_locale,
                ),
                actions: provider.cell_actions(menu, column),
            })
            .collect();
        rows.push(GridRow { id: menu.id, cells });
    }

    Ok(Json(DataResponse { data: rows }))
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// GET /api/v1/journals/{journal_id}/navigation-menu-items
pub async fn list_items(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<NavigationMenuItem>>>> {
    load_journal(&state.pool, journal_id).await?;
    let items = NavigationMenuItemRepo::list_by_context(&state.pool, journal_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/journals/{journal_id}/navigation-menu-items
pub async fn create_item(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path(journal_id): Path<DbId>,
    Json(input): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<NavigationMenuItem>>)> {
    input.validate()?;
    load_journal(&state.pool, journal_id).await?;

    let item = NavigationMenuItemRepo::create(
        &state.pool,
        journal_id,
        &CreateNavigationMenuItem {
            item_type: input.item_type,
            path: input.path,
            titles: input.titles,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// DELETE /api/v1/journals/{journal_id}/navigation-menu-items/{id}
pub async fn delete_item(
    RequireManager(_manager): RequireManager,
    State(state): State<AppState>,
    Path((journal_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if NavigationMenuItemRepo::delete(&state.pool, journal_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("NavigationMenuItem", id))
    }
}
