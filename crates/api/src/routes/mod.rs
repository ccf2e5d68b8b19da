pub mod auth;
pub mod candidates;
pub mod document;
pub mod health;
pub mod sheet;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                     login (public)
///
/// /candidates                     list (?q=), create, delete all
/// /candidates/import              import JSON array (POST)
/// /candidates/import/csv          import CSV body (POST)
/// /candidates/export              CSV download (GET, ?q=)
/// /candidates/reload              re-read backend (POST)
/// /candidates/{id}                get, update, delete
///
/// /document                       whole collection: read, replace
///
/// /sheet/append                   append one row to the sheet (POST)
/// ```
///
/// Everything except `/auth/login` requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/candidates", candidates::router())
        .nest("/document", document::router())
        .nest("/sheet", sheet::router())
}
