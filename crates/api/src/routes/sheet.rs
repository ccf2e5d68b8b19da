use axum::routing::post;
use axum::Router;

use crate::handlers::sheet;
use crate::state::AppState;

/// Routes mounted at `/sheet`.
///
/// ```text
/// POST /append    -> append
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/append", post(sheet::append))
}
