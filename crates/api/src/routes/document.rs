use axum::routing::get;
use axum::Router;

use crate::handlers::document;
use crate::state::AppState;

/// Routes mounted at `/document`.
///
/// ```text
/// GET  /    -> get_document
/// POST /    -> replace_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(document::get_document).post(document::replace_document),
    )
}
