//! Handler for `/sheet/append`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use candidates_core::candidate::Candidate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/sheet/append
///
/// Append one record as a row of the configured sheet. Needs service-account
/// credentials; returns 400 without them and 502 when the sheet API fails.
pub async fn append(
    user: AuthUser,
    State(state): State<AppState>,
    Json(mut candidate): Json<Candidate>,
) -> AppResult<impl IntoResponse> {
    let sheet = state
        .sheet
        .as_ref()
        .filter(|s| s.is_writable())
        .ok_or_else(|| {
            AppError::BadRequest("Sheet service account credentials are not configured".into())
        })?;

    candidate.derive_total();
    sheet.append(&candidate).await?;

    tracing::info!(candidate_id = %candidate.id, username = %user.username, "Candidate appended to sheet");
    Ok((StatusCode::CREATED, Json(DataResponse { data: candidate })))
}
