//! Route definitions for resources scoped to one journal.

use axum::routing::{any, get, post, put};
use axum::Router;

use crate::handlers::{
    admin, agencies, announcements, journals, navigation_menus, payments, pub_ids, subeditors,
    tombstones,
};
use crate::state::AppState;

/// Routes mounted at `/journals/{journal_id}`.
///
/// Every handler requires a manager of the journal, except the `admin`
/// routes which always answer 403.
///
/// ```text
/// PUT    /settings                                  -> journals::update_settings
/// ANY    /admin, /admin/{*rest}                     -> admin::refuse_in_context
///
/// GET    /announcements                             -> announcements::list
/// POST   /announcements                             -> announcements::create
/// GET    /announcements/{id}                        -> announcements::get_by_id
/// PUT    /announcements/{id}                        -> announcements::update
/// DELETE /announcements/{id}                        -> announcements::delete
/// GET    /announcement-types                        -> announcements::list_types
/// POST   /announcement-types                        -> announcements::create_type
/// DELETE /announcement-types/{id}                   -> announcements::delete_type
///
/// GET    /navigation-menus                          -> navigation_menus::list_menus
/// POST   /navigation-menus                          -> navigation_menus::create_menu
/// GET    /navigation-menus/grid                     -> navigation_menus::grid
/// GET    /navigation-menus/{id}                     -> navigation_menus::get_menu
/// PUT    /navigation-menus/{id}                     -> navigation_menus::update_menu
/// DELETE /navigation-menus/{id}                     -> navigation_menus::delete_menu
/// PUT    /navigation-menus/{id}/assignments         -> navigation_menus::replace_assignments
/// GET    /navigation-menu-items                     -> navigation_menus::list_items
/// POST   /navigation-menu-items                     -> navigation_menus::create_item
/// DELETE /navigation-menu-items/{id}                -> navigation_menus::delete_item
///
/// POST   /payments/queue                            -> payments::queue_payment
/// GET    /payments/queued/{id}                      -> payments::get_queued_payment
/// GET    /payments/queued/{id}/form                 -> payments::payment_form
/// POST   /payments/queued/{id}/fulfill              -> payments::fulfill_queued_payment
/// GET    /payments/configuration                    -> payments::configuration_form
/// GET    /payments/completed                        -> payments::list_completed_payments
///
/// GET    /pub-ids/{kind}/{id}                       -> pub_ids::get_form
/// PUT    /pub-ids/{kind}/{id}                       -> pub_ids::update
/// DELETE /pub-ids/{kind}/{id}/{pub_id_type}         -> pub_ids::clear
///
/// GET    /publications/{id}/agencies                -> agencies::get_agencies
/// PUT    /publications/{id}/agencies                -> agencies::replace_agencies
/// GET    /controlled-vocabs/{vocab_id}/entries      -> agencies::list_entries
/// POST   /controlled-vocabs/{vocab_id}/entries      -> agencies::create_entry
/// PUT    /controlled-vocabs/{vocab_id}/entries/{id} -> agencies::update_entry
/// DELETE /controlled-vocabs/{vocab_id}/entries/{id} -> agencies::delete_entry
///
/// POST   /subeditors                                -> subeditors::assign
/// GET    /subeditors/{group}/{assoc_id}             -> subeditors::list_by_group
/// DELETE /subeditors/{group}/{assoc_id}/{user_id}   -> subeditors::remove
/// GET    /users/{user_id}/subeditor-groups          -> subeditors::list_by_user
///
/// POST   /tombstones                                -> tombstones::create
/// DELETE /tombstones/{id}                           -> tombstones::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", put(journals::update_settings))
        .route("/admin", any(admin::refuse_in_context))
        .route("/admin/{*rest}", any(admin::refuse_in_context))
        // Announcements.
        .route(
            "/announcements",
            get(announcements::list).post(announcements::create),
        )
        .route(
            "/announcements/{id}",
            get(announcements::get_by_id)
                .put(announcements::update)
                .delete(announcements::delete),
        )
        .route(
            "/announcement-types",
            get(announcements::list_types).post(announcements::create_type),
        )
        .route(
            "/announcement-types/{id}",
            axum::routing::delete(announcements::delete_type),
        )
        // Navigation menus.
        .route(
            "/navigation-menus",
            get(navigation_menus::list_menus).post(navigation_menus::create_menu),
        )
        .route("/navigation-menus/grid", get(navigation_menus::grid))
        .route(
            "/navigation-menus/{id}",
            get(navigation_menus::get_menu)
                .put(navigation_menus::update_menu)
                .delete(navigation_menus::delete_menu),
        )
        .route(
            "/navigation-menus/{id}/assignments",
            put(navigation_menus::replace_assignments),
        )
        .route(
            "/navigation-menu-items",
            get(navigation_menus::list_items).post(navigation_menus::create_item),
        )
        .route(
            "/navigation-menu-items/{id}",
            axum::routing::delete(navigation_menus::delete_item),
        )
        // Payments.
        .route("/payments/queue", post(payments::queue_payment))
        .route("/payments/queued/{id}", get(payments::get_queued_payment))
        .route("/payments/queued/{id}/form", get(payments::payment_form))
        .route(
            "/payments/queued/{id}/fulfill",
            post(payments::fulfill_queued_payment),
        )
        .route("/payments/configuration", get(payments::configuration_form))
        .route("/payments/completed", get(payments::list_completed_payments))
        // Public identifiers.
        .route(
            "/pub-ids/{kind}/{id}",
            get(pub_ids::get_form).put(pub_ids::update),
        )
        .route(
            "/pub-ids/{kind}/{id}/{pub_id_type}",
            axum::routing::delete(pub_ids::clear),
        )
        // Submission agencies.
        .route(
            "/publications/{id}/agencies",
            get(agencies::get_agencies).put(agencies::replace_agencies),
        )
        .route(
            "/controlled-vocabs/{vocab_id}/entries",
            get(agencies::list_entries).post(agencies::create_entry),
        )
        .route(
            "/controlled-vocabs/{vocab_id}/entries/{id}",
            axum::routing::put(agencies::update_entry).delete(agencies::delete_entry),
        )
        // Subeditors.
        .route("/subeditors", post(subeditors::assign))
        .route(
            "/subeditors/{group}/{assoc_id}",
            get(subeditors::list_by_group),
        )
        .route(
            "/subeditors/{group}/{assoc_id}/{user_id}",
            axum::routing::delete(subeditors::remove),
        )
        .route(
            "/users/{user_id}/subeditor-groups",
            get(subeditors::list_by_user),
        )
        // Tombstones.
        .route("/tombstones", post(tombstones::create))
        .route(
            "/tombstones/{id}",
            axum::routing::delete(tombstones::delete),
        )
}
