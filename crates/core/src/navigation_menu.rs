//! Navigation menus and their item trees.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::DbId;

pub const NMI_TYPE_ABOUT: &str = "NMI_TYPE_ABOUT";
pub const NMI_TYPE_SUBMISSIONS: &str = "NMI_TYPE_SUBMISSIONS";
pub const NMI_TYPE_EDITORIAL_TEAM: &str = "NMI_TYPE_EDITORIAL_TEAM";
pub const NMI_TYPE_CONTACT: &str = "NMI_TYPE_CONTACT";
pub const NMI_TYPE_ANNOUNCEMENTS: &str = "NMI_TYPE_ANNOUNCEMENTS";
pub const NMI_TYPE_CURRENT: &str = "NMI_TYPE_CURRENT";
pub const NMI_TYPE_ARCHIVES: &str = "NMI_TYPE_ARCHIVES";
pub const NMI_TYPE_SEARCH: &str = "NMI_TYPE_SEARCH";
pub const NMI_TYPE_PRIVACY: &str = "NMI_TYPE_PRIVACY";
pub const NMI_TYPE_USER_LOGIN: &str = "NMI_TYPE_USER_LOGIN";
pub const NMI_TYPE_USER_REGISTER: &str = "NMI_TYPE_USER_REGISTER";
pub const NMI_TYPE_USER_DASHBOARD: &str = "NMI_TYPE_USER_DASHBOARD";
pub const NMI_TYPE_ADMINISTRATION: &str = "NMI_TYPE_ADMINISTRATION";
pub const NMI_TYPE_CUSTOM: &str = "NMI_TYPE_CUSTOM";
pub const NMI_TYPE_REMOTE_URL: &str = "NMI_TYPE_REMOTE_URL";

/// Locale-key title shown for built-in item types that have no custom title.
pub fn default_title_key(item_type: &str) -> Option<&'static str> {
    let key = match item_type {
        NMI_TYPE_ABOUT => "about.aboutContext",
        NMI_TYPE_SUBMISSIONS => "about.submissions",
        NMI_TYPE_EDITORIAL_TEAM => "about.editorialTeam",
        NMI_TYPE_CONTACT => "about.contact",
        NMI_TYPE_ANNOUNCEMENTS => "announcement.announcements",
        NMI_TYPE_CURRENT => "navigation.current",
        NMI_TYPE_ARCHIVES => "navigation.archives",
        NMI_TYPE_SEARCH => "common.search",
        NMI_TYPE_PRIVACY => "manager.setup.privacyStatement",
        NMI_TYPE_USER_LOGIN => "navigation.login",
        NMI_TYPE_USER_REGISTER => "navigation.register",
        NMI_TYPE_USER_DASHBOARD => "navigation.dashboard",
        NMI_TYPE_ADMINISTRATION => "navigation.admin",
        _ => return None,
    };
    Some(key)
}

/// A menu placed in a theme's navigation area.
///
/// Title and area name are not localized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationMenu {
    pub id: DbId,
    pub context_id: DbId,
    pub title: String,
    pub area_name: Option<String>,
    /// Hierarchical items, filled only when explicitly loaded.
    pub menu_tree: Option<Vec<MenuTreeNode>>,
}

/// A single menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationMenuItem {
    pub id: DbId,
    pub context_id: DbId,
    pub path: Option<String>,
    pub item_type: String,
    /// Locale -> title.
    pub titles: BTreeMap<String, String>,
}

impl NavigationMenuItem {
    /// Title in `locale`, falling back to `primary_locale`, then to the
    /// item type's default title key.
    pub fn localized_title(&self, locale: &str, primary_locale: &str) -> String {
        self.titles
            .get(locale)
            .filter(|t| !t.is_empty())
            .or_else(|| self.titles.get(primary_locale).filter(|t| !t.is_empty()))
            .cloned()
            .or_else(|| default_title_key(&self.item_type).map(str::to_string))
            .unwrap_or_default()
    }
}

/// Placement of an item inside a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAssignment {
    pub item_id: DbId,
    /// `None` (or 0) for top-level items.
    pub parent_id: Option<DbId>,
    pub seq: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTreeNode {
    pub item: NavigationMenuItem,
    pub children: Vec<MenuTreeNode>,
}

/// Arrange assigned items into a tree ordered by `seq`.
///
/// Items whose parent is not assigned to the menu are promoted to the top
/// level. Unassigned items are left out.
pub fn build_menu_tree(
    items: &[NavigationMenuItem],
    assignments: &[ItemAssignment],
) -> Vec<MenuTreeNode> {
    let by_id: HashMap<DbId, &NavigationMenuItem> = items.iter().map(|i| (i.id, i)).collect();
    let assigned: HashSet<DbId> = assignments
        .iter()
        .filter(|a| by_id.contains_key(&a.item_id))
        .map(|a| a.item_id)
        .collect();

    let mut ordered: Vec<&ItemAssignment> = assignments
        .iter()
        .filter(|a| assigned.contains(&a.item_id))
        .collect();
    ordered.sort_by_key(|a| (a.seq, a.item_id));

    let mut children: HashMap<Option<DbId>, Vec<DbId>> = HashMap::new();
    for a in ordered {
        let parent = a
            .parent_id
            .filter(|p| *p != 0 && *p != a.item_id && assigned.contains(p));
        children.entry(parent).or_default().push(a.item_id);
    }

    let mut visited = HashSet::new();
    let mut tree = build_level(None, &children, &by_id, &mut visited);

    // Items caught in a parent cycle are never reached from the top level.
    let stranded: Vec<DbId> = children
        .values()
        .flatten()
        .filter(|id| !visited.contains(id))
        .copied()
        .collect();
    let mut stranded_in_order = Vec::new();
    for a in assignments {
        if stranded.contains(&a.item_id) && !stranded_in_order.contains(&a.item_id) {
            stranded_in_order.push(a.item_id);
        }
    }
    for id in stranded_in_order {
        if visited.insert(id) {
            if let Some(item) = by_id.get(&id) {
                tree.push(MenuTreeNode {
                    item: (*item).clone(),
                    children: build_level(Some(id), &children, &by_id, &mut visited),
                });
            }
        }
    }
    tree
}

/// First item whose parent chain leads back to itself, if any.
///
/// Parents of 0, of the item itself, or outside the assignment list end a
/// chain.
pub fn find_parent_cycle(assignments: &[ItemAssignment]) -> Option<DbId> {
    let parent_of: HashMap<DbId, DbId> = assignments
        .iter()
        .filter_map(|a| {
            a.parent_id
                .filter(|p| *p != 0 && *p != a.item_id)
                .map(|p| (a.item_id, p))
        })
        .collect();

    for a in assignments {
        let mut seen = HashSet::from([a.item_id]);
        let mut current = a.item_id;
        while let Some(parent) = parent_of.get(&current) {
            if !seen.insert(*parent) {
                return Some(a.item_id);
            }
            current = *parent;
        }
    }
    None
}

fn build_level(
    parent: Option<DbId>,
    children: &HashMap<Option<DbId>, Vec<DbId>>,
    by_id: &HashMap<DbId, &NavigationMenuItem>,
    visited: &mut HashSet<DbId>,
) -> Vec<MenuTreeNode> {
    let Some(ids) = children.get(&parent) else {
        return Vec::new();
    };
    let mut nodes = Vec::with_capacity(ids.len());
    for id in ids {
        if !visited.insert(*id) {
            continue;
        }
        if let Some(item) = by_id.get(id) {
            nodes.push(MenuTreeNode {
                item: (*item).clone(),
                children: build_level(Some(*id), children, by_id, visited),
            });
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: DbId, item_type: &str, title: Option<&str>) -> NavigationMenuItem {
        let mut titles = BTreeMap::new();
        if let Some(t) = title {
            titles.insert("en".to_string(), t.to_string());
        }
        NavigationMenuItem {
            id,
            context_id: 1,
            path: None,
            item_type: item_type.to_string(),
            titles,
        }
    }

    fn assign(item_id: DbId, parent_id: Option<DbId>, seq: i32) -> ItemAssignment {
        ItemAssignment {
            item_id,
            parent_id,
            seq,
        }
    }

    #[test]
    fn title_falls_back_to_primary_then_type_default() {
        let custom = item(1, NMI_TYPE_CUSTOM, Some("Policies"));
        assert_eq!(custom.localized_title("fr", "en"), "Policies");

        let about = item(2, NMI_TYPE_ABOUT, None);
        assert_eq!(about.localized_title("fr", "en"), "about.aboutContext");

        let bare = item(3, NMI_TYPE_CUSTOM, None);
        assert_eq!(bare.localized_title("en", "en"), "");
    }

    #[test]
    fn tree_orders_by_seq_and_nests_children() {
        let items = vec![
            item(1, NMI_TYPE_ABOUT, None),
            item(2, NMI_TYPE_CONTACT, None),
            item(3, NMI_TYPE_EDITORIAL_TEAM, None),
        ];
        let assignments = vec![
            assign(2, None, 0),
            assign(1, Some(0), 1),
            assign(3, Some(1), 0),
        ];

        let tree = build_menu_tree(&items, &assignments);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].item.id, 2);
        assert_eq!(tree[1].item.id, 1);
        assert_eq!(tree[1].children.len(), 1);
        assert_eq!(tree[1].children[0].item.id, 3);
    }

    #[test]
    fn orphaned_children_are_promoted() {
        let items = vec![item(5, NMI_TYPE_SEARCH, None)];
        let tree = build_menu_tree(&items, &[assign(5, Some(42), 0)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].item.id, 5);
    }

    #[test]
    fn unassigned_items_are_left_out() {
        let items = vec![item(1, NMI_TYPE_ABOUT, None), item(2, NMI_TYPE_SEARCH, None)];
        let tree = build_menu_tree(&items, &[assign(2, None, 0)]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].item.id, 2);
    }

    #[test]
    fn items_in_a_parent_cycle_are_kept_at_top_level() {
        let items = vec![
            item(1, NMI_TYPE_ABOUT, None),
            item(2, NMI_TYPE_CONTACT, None),
            item(3, NMI_TYPE_SEARCH, None),
        ];
        let assignments = vec![
            assign(1, Some(2), 0),
            assign(2, Some(1), 1),
            assign(3, None, 2),
        ];

        let tree = build_menu_tree(&items, &assignments);
        let top: Vec<DbId> = tree.iter().map(|n| n.item.id).collect();
        assert_eq!(top, vec![3, 1]);
        assert_eq!(tree[1].children.len(), 1);
        assert_eq!(tree[1].children[0].item.id, 2);
    }

    #[test]
    fn parent_cycles_are_detected() {
        let cyclic = [assign(1, Some(2), 0), assign(2, Some(3), 0), assign(3, Some(1), 0)];
        assert!(find_parent_cycle(&cyclic).is_some());

        let nested = [assign(1, None, 0), assign(2, Some(1), 0), assign(3, Some(2), 0)];
        assert_eq!(find_parent_cycle(&nested), None);
        assert_eq!(find_parent_cycle(&[assign(1, Some(1), 0)]), None);
        assert_eq!(find_parent_cycle(&[assign(1, Some(0), 0)]), None);
    }

    #[test]
    fn self_parent_does_not_loop() {
        let items = vec![item(1, NMI_TYPE_ABOUT, None)];
        let tree = build_menu_tree(&items, &[assign(1, Some(1), 0)]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }
}
