//! Navigation menu, item and assignment rows and DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use scholar_core::navigation_menu::{ItemAssignment, NavigationMenu, NavigationMenuItem};
use scholar_core::types::DbId;

/// Localized item setting holding the title.
pub const ITEM_SETTING_TITLE: &str = "title";

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `navigation_menus` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NavigationMenuRow {
    pub id: DbId,
    pub context_id: DbId,
    pub area_name: Option<String>,
    pub title: String,
}

impl From<NavigationMenuRow> for NavigationMenu {
    fn from(row: NavigationMenuRow) -> Self {
        Self {
            id: row.id,
            context_id: row.context_id,
            title: row.title,
            area_name: row.area_name.filter(|a| !a.is_empty()),
            menu_tree: None,
        }
    }
}

/// A row from the `navigation_menu_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NavigationMenuItemRow {
    pub id: DbId,
    pub context_id: DbId,
    pub path: Option<String>,
    pub item_type: Option<String>,
}

impl NavigationMenuItemRow {
    pub fn with_titles(self, titles: BTreeMap<String, String>) -> NavigationMenuItem {
        NavigationMenuItem {
            id: self.id,
            context_id: self.context_id,
            path: self.path.filter(|p| !p.is_empty()),
            item_type: self.item_type.unwrap_or_default(),
            titles,
        }
    }
}

/// A row from the `navigation_menu_item_assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssignmentRow {
    pub id: DbId,
    pub navigation_menu_id: DbId,
    pub navigation_menu_item_id: DbId,
    pub parent_id: Option<DbId>,
    pub seq: i32,
}

impl From<&AssignmentRow> for ItemAssignment {
    fn from(row: &AssignmentRow) -> Self {
        Self {
            item_id: row.navigation_menu_item_id,
            parent_id: row.parent_id,
            seq: row.seq,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateNavigationMenu {
    pub title: String,
    pub area_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNavigationMenu {
    pub title: Option<String>,
    pub area_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateNavigationMenuItem {
    pub item_type: String,
    pub path: Option<String>,
    #[serde(default)]
    pub titles: BTreeMap<String, String>,
}

/// Placement of one item, used to replace a menu's whole tree.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignItem {
    pub item_id: DbId,
    pub parent_id: Option<DbId>,
    #[serde(default)]
    pub seq: i32,
}
