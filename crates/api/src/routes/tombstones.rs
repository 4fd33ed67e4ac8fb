//! Route definitions for the public `/tombstones` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::tombstones;
use crate::state::AppState;

/// Routes mounted at `/tombstones`. No authentication.
///
/// ```text
/// GET /       -> list (?set_spec=&from=&until=&limit=&offset=)
/// GET /{id}   -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tombstones::list))
        .route("/{id}", get(tombstones::get_by_id))
}
