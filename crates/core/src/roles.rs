//! Well-known role name constants carried in access-token claims.

pub const ROLE_SITE_ADMIN: &str = "site_admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_SUB_EDITOR: &str = "sub_editor";
pub const ROLE_AUTHOR: &str = "author";
pub const ROLE_READER: &str = "reader";

/// Roles allowed to manage a journal's editorial data (menus, payments,
/// identifiers, subeditor assignments).
pub fn is_journal_manager(role: &str) -> bool {
    role == ROLE_SITE_ADMIN || role == ROLE_MANAGER
}
