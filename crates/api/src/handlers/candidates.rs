//! Handlers for the `/candidates` resource.
//!
//! Every mutation re-ranks the whole collection and writes it to the
//! configured backend before responding.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use candidates_core::candidate::{Candidate, CandidateInput};
use candidates_core::csv::{build_csv, parse_csv};
use candidates_core::error::CoreError;
use candidates_core::xlsx::{build_xlsx, parse_xlsx};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Byte-order mark so spreadsheet programs detect UTF-8 (Arabic text).
const UTF8_BOM: &str = "\u{feff}";

/// Query parameters for listing and export.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Free-text filter over every field.
    pub q: Option<String>,
}

/// Count returned by bulk operations.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

fn not_found(id: String) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Candidate",
        id,
    })
}

/// GET /api/v1/candidates
///
/// Records in rank order. `?q=` narrows to records with any field
/// containing the query (case-insensitive).
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Candidate>>>> {
    let records = state.candidates.list(params.q.as_deref()).await;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/candidates
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CandidateInput>,
) -> AppResult<impl IntoResponse> {
    let created = state.candidates.add(&input).await;
    tracing::info!(candidate_id = %created.id, order = created.order, username = %user.username, "Candidate added");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/candidates/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Candidate>>> {
    let candidate = state.candidates.get(&id).await.ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: candidate }))
}

/// PUT /api/v1/candidates/{id}
///
/// Merge the supplied fields into the record. `id`, `order` and
/// `totalPayments` in the body are ignored.
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CandidateInput>,
) -> AppResult<Json<DataResponse<Candidate>>> {
    let updated = state
        .candidates
        .update(&id, &input)
        .await
        .ok_or_else(|| not_found(id))?;
    tracing::info!(candidate_id = %updated.id, order = updated.order, username = %user.username, "Candidate updated");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/candidates/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let removed = state
        .candidates
        .remove(&id)
        .await
        .ok_or_else(|| not_found(id))?;
    tracing::info!(candidate_id = %removed.id, username = %user.username, "Candidate removed");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/candidates
pub async fn delete_all(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = state.candidates.remove_all().await;
    tracing::warn!(count, username = %user.username, "All candidates removed");
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// POST /api/v1/candidates/import
///
/// Append a JSON array of partial records, each with a fresh id.
pub async fn import_json(
    user: AuthUser,
    State(state): State<AppState>,
    Json(rows): Json<Vec<CandidateInput>>,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = state.candidates.import_many(&rows).await;
    tracing::info!(count, username = %user.username, "Candidates imported");
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// POST /api/v1/candidates/import/csv
///
/// Same as [`import_json`] with rows read from a CSV body.
pub async fn import_csv(
    user: AuthUser,
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let rows = parse_csv(&body)?;
    let count = state.candidates.import_many(&rows).await;
    tracing::info!(count, username = %user.username, "Candidates imported from CSV");
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// POST /api/v1/candidates/import/xlsx
///
/// Same as [`import_json`] with rows read from the first worksheet of an
/// uploaded workbook.
pub async fn import_xlsx(
    user: AuthUser,
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let rows = parse_xlsx(&body)?;
    let count = state.candidates.import_many(&rows).await;
    tracing::info!(count, username = %user.username, "Candidates imported from workbook");
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// GET /api/v1/candidates/export
///
/// Export the (optionally filtered) list as CSV.
pub async fn export_csv(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let records = state.candidates.list(params.q.as_deref()).await;
    let csv = format!("{UTF8_BOM}{}", build_csv(&records));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"candidates.csv\"",
            ),
        ],
        csv,
    ))
}

/// GET /api/v1/candidates/export/xlsx
pub async fn export_xlsx(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let records = state.candidates.list(params.q.as_deref()).await;
    let workbook = build_xlsx(&records)?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"candidates.xlsx\"",
            ),
        ],
        workbook,
    ))
}

/// POST /api/v1/candidates/reload
///
/// Re-read the backend, replacing the in-memory collection.
pub async fn reload(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = state.candidates.reload().await?;
    tracing::info!(count, username = %user.username, "Candidates reloaded");
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}
