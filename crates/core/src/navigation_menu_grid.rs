//! Cell content for the navigation-menu management grid.
//!
//! The grid has a `title` column (menu title, with an edit action) and an
//! `nmis` column listing the titles of the menu's items.

use serde::Serialize;

use crate::navigation_menu::{NavigationMenu, NavigationMenuItem};
use crate::types::DbId;

/// Known grid columns. Unknown ids fall through to default behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridColumn {
    Title,
    Nmis,
    Other(String),
}

impl GridColumn {
    pub fn from_id(id: &str) -> Self {
        match id {
            "title" => Self::Title,
            "nmis" => Self::Nmis,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::Nmis => "nmis",
            Self::Other(id) => id,
        }
    }
}

/// Variables handed to the cell renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CellTemplateVars {
    pub label: String,
}

/// A modal opened over the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AjaxModal {
    pub url: String,
    pub title: String,
    pub title_icon: Option<String>,
    pub can_close: bool,
}

/// A clickable action rendered inside a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAction {
    pub id: String,
    pub modal: AjaxModal,
    /// Already HTML-escaped.
    pub label: String,
}

/// Builds cell actions and template variables for menu rows.
#[derive(Debug, Clone)]
pub struct NavigationMenusGridCellProvider {
    /// Base URL of the grid component; actions are appended to it.
    component_url: String,
}

impl NavigationMenusGridCellProvider {
    pub fn new(component_url: impl Into<String>) -> Self {
        Self {
            component_url: component_url.into(),
        }
    }

    fn edit_url(&self, menu_id: DbId) -> String {
        format!(
            "{}/editNavigationMenu?navigationMenuId={menu_id}",
            self.component_url.trim_end_matches('/')
        )
    }

    /// Actions for a cell. Only the title column has one: edit the menu.
    pub fn cell_actions(&self, menu: &NavigationMenu, column: &GridColumn) -> Vec<LinkAction> {
        match column {
            GridColumn::Title => vec![LinkAction {
                id: "edit".to_string(),
                modal: AjaxModal {
                    url: self.edit_url(menu.id),
                    title: "grid.action.edit".to_string(),
                    title_icon: None,
                    can_close: true,
                },
                label: escape_html(&menu.title),
            }],
            _ => Vec::new(),
        }
    }

    /// Template variables for a cell.
    ///
    /// `items` are the items assigned to `menu`; titles resolve `locale`,
    /// then `primary_locale`, then the item type default.
    pub fn template_vars(
        &self,
        column: &GridColumn,
        items: &[NavigationMenuItem],
        locale: &str,
        primary_locale: &str,
    ) -> CellTemplateVars {
        match column {
            // The title column renders its action instead of a label.
            GridColumn::Title => CellTemplateVars::default(),
            GridColumn::Nmis => CellTemplateVars {
                label: join_item_titles(items, locale, primary_locale),
            },
            GridColumn::Other(_) => CellTemplateVars::default(),
        }
    }
}

/// Comma-separated item titles with stray separators trimmed off the ends.
pub fn join_item_titles(items: &[NavigationMenuItem], locale: &str, primary_locale: &str) -> String {
    let mut joined = String::new();
    for item in items {
        joined.push_str(&item.localized_title(locale, primary_locale));
        joined.push_str(", ");
    }
    joined
        .trim_matches(|c: char| c == ',' || c == ' ')
        .to_string()
}

/// Escape the five HTML special characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::navigation_menu::{NMI_TYPE_ABOUT, NMI_TYPE_CUSTOM};

    fn menu(title: &str) -> NavigationMenu {
        NavigationMenu {
            id: 7,
            context_id: 1,
            title: title.to_string(),
            area_name: Some("primary".to_string()),
            menu_tree: None,
        }
    }

    fn item(id: DbId, item_type: &str, en: Option<&str>) -> NavigationMenuItem {
        NavigationMenuItem {
            id,
            context_id: 1,
            path: None,
            item_type: item_type.to_string(),
            titles: en
                .map(|t| BTreeMap::from([("en".to_string(), t.to_string())]))
                .unwrap_or_default(),
        }
    }

    #[test]
    fn title_column_has_escaped_edit_action() {
        let provider = NavigationMenusGridCellProvider::new("/grid/navigation-menus/");
        let actions = provider.cell_actions(&menu("Main <Menu> & \"more\""), &GridColumn::Title);

        assert_eq!(actions.len(), 1);
        let action = &actions[0];
        assert_eq!(action.id, "edit");
        assert_eq!(action.label, "Main &lt;Menu&gt; &amp; &quot;more&quot;");
        assert_eq!(
            action.modal.url,
            "/grid/navigation-menus/editNavigationMenu?navigationMenuId=7"
        );
        assert_eq!(action.modal.title, "grid.action.edit");
        assert!(action.modal.can_close);
    }

    #[test]
    fn other_columns_have_no_actions() {
        let provider = NavigationMenusGridCellProvider::new("/grid");
        assert!(provider.cell_actions(&menu("x"), &GridColumn::Nmis).is_empty());
        assert!(provider
            .cell_actions(&menu("x"), &GridColumn::from_id("area"))
            .is_empty());
    }

    #[test]
    fn title_column_label_is_empty() {
        let provider = NavigationMenusGridCellProvider::new("/grid");
        let vars = provider.template_vars(&GridColumn::Title, &[], "en", "en");
        assert_eq!(vars.label, "");
    }

    #[test]
    fn nmis_column_joins_item_titles() {
        let provider = NavigationMenusGridCellProvider::new("/grid");
        let items = vec![
            item(1, NMI_TYPE_CUSTOM, Some("Policies")),
            item(2, NMI_TYPE_ABOUT, None),
        ];
        let vars = provider.template_vars(&GridColumn::Nmis, &items, "en", "en");
        assert_eq!(vars.label, "Policies, about.aboutContext");
    }

    #[test]
    fn nmis_column_empty_menu() {
        let provider = NavigationMenusGridCellProvider::new("/grid");
        let vars = provider.template_vars(&GridColumn::Nmis, &[], "en", "en");
        assert_eq!(vars.label, "");
    }

    #[test]
    fn nmis_trims_blank_titles_at_the_ends() {
        let items = vec![
            item(1, NMI_TYPE_CUSTOM, None),
            item(2, NMI_TYPE_CUSTOM, Some("Blog")),
        ];
        assert_eq!(join_item_titles(&items, "en", "en"), "Blog");
    }

    #[test]
    fn escape_html_covers_single_quotes() {
        assert_eq!(escape_html("Editor's <b>picks</b>"), "Editor&#039;s &lt;b&gt;picks&lt;/b&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
