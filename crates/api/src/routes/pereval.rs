//! Route definitions for pereval submissions.

use axum::routing::get;
use axum::Router;

use crate::handlers::pereval;
use crate::state::AppState;

/// Routes mounted at the root.
///
/// ```text
/// POST  /submitData                    -> create
/// GET   /submitData/?user__email=      -> list_by_email
/// GET   /submitData/{id}               -> get_by_id
/// PATCH /submitData/{id}               -> update
/// ```
///
/// The collection is reachable with and without the trailing slash.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/submitData",
            get(pereval::list_by_email).post(pereval::create),
        )
        .route(
            "/submitData/",
            get(pereval::list_by_email).post(pereval::create),
        )
        .route(
            "/submitData/{id}",
            get(pereval::get_by_id).patch(pereval::update),
        )
}
