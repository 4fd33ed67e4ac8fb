//! Repository for navigation menus, their items and item assignments.

use std::collections::BTreeMap;

use sqlx::PgPool;
use scholar_core::navigation_menu::{
    build_menu_tree, ItemAssignment, NavigationMenu, NavigationMenuItem,
};
use scholar_core::types::DbId;

use crate::models::navigation_menu::{
    AssignItem, AssignmentRow, CreateNavigationMenu, CreateNavigationMenuItem,
    NavigationMenuItemRow, NavigationMenuRow, UpdateNavigationMenu, ITEM_SETTING_TITLE,
};
use crate::repositories::settings::NAVIGATION_MENU_ITEM_SETTINGS;

/// Column list for `navigation_menus` queries.
const MENU_COLUMNS: &str = "navigation_menu_id AS id, context_id, area_name, title";

/// Column list for `navigation_menu_items` queries.
const ITEM_COLUMNS: &str = "navigation_menu_item_id AS id, context_id, path, type AS item_type";

/// Column list for `navigation_menu_item_assignments` queries.
const ASSIGNMENT_COLUMNS: &str = "\
    navigation_menu_item_assignment_id AS id, navigation_menu_id, \
    navigation_menu_item_id, parent_id, seq";

/// Provides CRUD operations for navigation menus.
pub struct NavigationMenuRepo;

impl NavigationMenuRepo {
    pub async fn create(
        pool: &PgPool,
        context_id: DbId,
        input: &CreateNavigationMenu,
    ) -> Result<NavigationMenu, sqlx::Error> {
        let query = format!(
            "INSERT INTO navigation_menus (context_id, title, area_name) \
             VALUES ($1, $2, COALESCE($3, '')) \
             RETURNING {MENU_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NavigationMenuRow>(&query)
            .bind(context_id)
            .bind(&input.title)
            .bind(&input.area_name)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Find a menu by ID within a journal. The tree is not loaded.
    pub async fn find_by_id(
        pool: &PgPool,
        context_id: DbId,
        id: DbId,
    ) -> Result<Option<NavigationMenu>, sqlx::Error> {
        let query = format!(
            "SELECT {MENU_COLUMNS} FROM navigation_menus \
             WHERE navigation_menu_id = $1 AND context_id = $2"
        );
        let row = sqlx::query_as::<_, NavigationMenuRow>(&query)
            .bind(id)
            .bind(context_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Menus of a journal, by title.
    pub async fn list_by_context(
        pool: &PgPool,
        context_id: DbId,
    ) -> Result<Vec<NavigationMenu>, sqlx::Error> {
        let query = format!(
            "SELECT {MENU_COLUMNS} FROM navigation_menus \
             WHERE context_id = $1 ORDER BY title, navigation_menu_id"
        );
        let rows = sqlx::query_as::<_, NavigationMenuRow>(&query)
            .bind(context_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The menu shown in a theme area, if any.
    pub async fn find_by_area(
        pool: &PgPool,
        context_id: DbId,
        area_name: &str,
    ) -> Result<Option<NavigationMenu>, sqlx::Error> {
        let query = format!(
            "SELECT {MENU_COLUMNS} FROM navigation_menus \
             WHERE context_id = $1 AND area_name = $2 \
             ORDER BY navigation_menu_id LIMIT 1"
        );
        let row = sqlx::query_as::<_, NavigationMenuRow>(&query)
            .bind(context_id)
            .bind(area_name)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn update(
        pool: &PgPool,
        context_id: DbId,
        id: DbId,
        input: &UpdateNavigationMenu,
    ) -> Result<Option<NavigationMenu>, sqlx::Error> {
        let query = format!(
            "UPDATE navigation_menus SET \
                title = COALESCE($3, title), \
                area_name = COALESCE($4, area_name) \
             WHERE navigation_menu_id = $1 AND context_id = $2 \
             RETURNING {MENU_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NavigationMenuRow>(&query)
            .bind(id)
            .bind(context_id)
            .bind(&input.title)
            .bind(&input.area_name)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Delete a menu. Its assignments cascade; the items remain.
    pub async fn delete(pool: &PgPool, context_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM navigation_menus WHERE navigation_menu_id = $1 AND context_id = $2",
        )
        .bind(id)
        .bind(context_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Items assigned to a menu, in assignment order, with their titles.
    pub async fn assigned_items(
        pool: &PgPool,
        menu_id: DbId,
    ) -> Result<Vec<NavigationMenuItem>, sqlx::Error> {
        let rows = sqlx::query_as::<_, NavigationMenuItemRow>(
            "SELECT i.navigation_menu_item_id AS id, i.context_id, i.path, i.type AS item_type \
             FROM navigation_menu_items i \
             JOIN navigation_menu_item_assignments a \
               ON a.navigation_menu_item_id = i.navigation_menu_item_id \
             WHERE a.navigation_menu_id = $1 \
             ORDER BY a.seq, a.navigation_menu_item_id",
        )
        .bind(menu_id)
        .fetch_all(pool)
        .await?;
        with_titles(pool, rows).await
    }

    pub async fn assignments(
        pool: &PgPool,
        menu_id: DbId,
    ) -> Result<Vec<AssignmentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM navigation_menu_item_assignments \
             WHERE navigation_menu_id = $1 ORDER BY seq, navigation_menu_item_id"
        );
        sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(menu_id)
            .fetch_all(pool)
            .await
    }

    /// Fill in the menu's item tree.
    pub async fn load_tree(pool: &PgPool, menu: &mut NavigationMenu) -> Result<(), sqlx::Error> {
        let items = Self::assigned_items(pool, menu.id).await?;
        let assignments: Vec<ItemAssignment> = Self::assignments(pool, menu.id)
            .await?
            .iter()
            .map(Into::into)
            .collect();
        menu.menu_tree = Some(build_menu_tree(&items, &assignments));
        Ok(())
    }

    /// Replace every assignment of a menu in one transaction.
    pub async fn replace_assignments(
        pool: &PgPool,
        menu_id: DbId,
        items: &[AssignItem],
    ) -> Result<Vec<AssignmentRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM navigation_menu_item_assignments WHERE navigation_menu_id = $1")
            .bind(menu_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO navigation_menu_item_assignments \
                (navigation_menu_id, navigation_menu_item_id, parent_id, seq) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let row = sqlx::query_as::<_, AssignmentRow>(&query)
                .bind(menu_id)
                .bind(item.item_id)
                .bind(item.parent_id.filter(|p| *p != 0))
                .bind(item.seq)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }
}

/// Provides CRUD operations for navigation menu items.
pub struct NavigationMenuItemRepo;

impl NavigationMenuItemRepo {
    pub async fn create(
        pool: &PgPool,
        context_id: DbId,
        input: &CreateNavigationMenuItem,
    ) -> Result<NavigationMenuItem, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO navigation_menu_items (context_id, path, type) \
             VALUES ($1, COALESCE($2, ''), $3) \
             RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NavigationMenuItemRow>(&query)
            .bind(context_id)
            .bind(&input.path)
            .bind(&input.item_type)
            .fetch_one(&mut *tx)
            .await?;

        NAVIGATION_MENU_ITEM_SETTINGS
            .set_localized(&mut tx, row.id, ITEM_SETTING_TITLE, &input.titles)
            .await?;

        tx.commit().await?;
        let titles = input
            .titles
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(row.with_titles(titles))
    }

    pub async fn find_by_id(
        pool: &PgPool,
        context_id: DbId,
        id: DbId,
    ) -> Result<Option<NavigationMenuItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM navigation_menu_items \
             WHERE navigation_menu_item_id = $1 AND context_id = $2"
        );
        let Some(row) = sqlx::query_as::<_, NavigationMenuItemRow>(&query)
            .bind(id)
            .bind(context_id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(with_titles(pool, vec![row]).await?.pop())
    }

    pub async fn list_by_context(
        pool: &PgPool,
        context_id: DbId,
    ) -> Result<Vec<NavigationMenuItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM navigation_menu_items \
             WHERE context_id = $1 ORDER BY navigation_menu_item_id"
        );
        let rows = sqlx::query_as::<_, NavigationMenuItemRow>(&query)
            .bind(context_id)
            .fetch_all(pool)
            .await?;
        with_titles(pool, rows).await
    }

    /// Delete an item. Settings and assignments cascade.
    pub async fn delete(pool: &PgPool, context_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM navigation_menu_items \
             WHERE navigation_menu_item_id = $1 AND context_id = $2",
        )
        .bind(id)
        .bind(context_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn with_titles(
    pool: &PgPool,
    rows: Vec<NavigationMenuItemRow>,
) -> Result<Vec<NavigationMenuItem>, sqlx::Error> {
    let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
    let mut settings = NAVIGATION_MENU_ITEM_SETTINGS.load(pool, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let titles = settings
                .remove(&row.id)
                .and_then(|mut s| s.remove(ITEM_SETTING_TITLE))
                .unwrap_or_else(BTreeMap::new);
            row.with_titles(titles)
        })
        .collect())
}
