pub mod admin;
pub mod health;
pub mod journals;
pub mod tombstones;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin                                            index (site admin)
/// /admin/contexts                                   list, create journals
/// /admin/settings                                   site settings
/// /admin/wizard/{id}                                journal settings wizard
/// /admin/system-info                                versions, server, config
/// /admin/expire-sessions                            sign everyone out (POST)
/// /admin/scheduled-tasks                            task status
/// /admin/scheduled-task-logs                        clear logs (DELETE)
/// /admin/scheduled-task-logs/{file}                 download one log
///
/// /tombstones                                       harvest deleted objects (public)
/// /tombstones/{id}                                  one tombstone (public)
///
/// /journals/{journal_id}/settings                   update journal settings (PUT)
/// /journals/{journal_id}/admin[/...]                refused (403)
/// /journals/{journal_id}/announcements              list, create
/// /journals/{journal_id}/announcements/{id}         get, update, delete
/// /journals/{journal_id}/announcement-types         list, create
/// /journals/{journal_id}/announcement-types/{id}    delete
/// /journals/{journal_id}/navigation-menus           list, create
/// /journals/{journal_id}/navigation-menus/grid      management grid rows
/// /journals/{journal_id}/navigation-menus/{id}      get, update, delete
/// /journals/{journal_id}/navigation-menus/{id}/assignments  replace items (PUT)
/// /journals/{journal_id}/navigation-menu-items      list, create
/// /journals/{journal_id}/navigation-menu-items/{id} delete
/// /journals/{journal_id}/payments/...               queue, fulfill, forms
/// /journals/{journal_id}/pub-ids/{kind}/{id}        identifiers form
/// /journals/{journal_id}/publications/{id}/agencies submission agencies
/// /journals/{journal_id}/controlled-vocabs/{vocab_id}/entries[/{id}]
/// /journals/{journal_id}/subeditors[/...]           subeditor assignments
/// /journals/{journal_id}/users/{user_id}/subeditor-groups
/// /journals/{journal_id}/tombstones[/{id}]          record, remove tombstones
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Site administration.
        .nest("/admin", admin::router())
        // OAI tombstones, readable without authentication.
        .nest("/tombstones", tombstones::router())
        // Everything scoped to one hosted journal.
        .nest("/journals/{journal_id}", journals::router())
}
