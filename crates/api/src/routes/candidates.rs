//! Route definitions for the `/candidates` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::candidates;
use crate::state::AppState;

/// Routes mounted at `/candidates`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// DELETE /              -> delete_all
/// POST   /import        -> import_json
/// POST   /import/csv    -> import_csv
/// POST   /import/xlsx   -> import_xlsx
/// GET    /export        -> export_csv
/// GET    /export/xlsx   -> export_xlsx
/// POST   /reload        -> reload
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(candidates::list)
                .post(candidates::create)
                .delete(candidates::delete_all),
        )
        .route("/import", post(candidates::import_json))
        .route("/import/csv", post(candidates::import_csv))
        .route("/import/xlsx", post(candidates::import_xlsx))
        .route("/export", get(candidates::export_csv))
        .route("/export/xlsx", get(candidates::export_xlsx))
        .route("/reload", post(candidates::reload))
        .route(
            "/{id}",
            get(candidates::get_by_id)
                .put(candidates::update)
                .delete(candidates::delete),
        )
}
