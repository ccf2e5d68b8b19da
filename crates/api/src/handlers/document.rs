//! Handlers for `/document`: the whole collection as one JSON array.

use axum::extract::State;
use axum::Json;
use candidates_core::candidate::Candidate;

use crate::error::AppResult;
use crate::handlers::candidates::CountResponse;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/document
pub async fn get_document(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Candidate>>>> {
    Ok(Json(DataResponse {
        data: state.candidates.list(None).await,
    }))
}

/// POST /api/v1/document
///
/// Replace the whole collection. Totals and ranks are re-derived; blank or
/// duplicate ids are replaced with fresh ones.
pub async fn replace_document(
    user: AuthUser,
    State(state): State<AppState>,
    Json(records): Json<Vec<Candidate>>,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = state.candidates.replace_all(records).await;
    tracing::info!(count, username = %user.username, "Collection replaced");
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}
