//! Fetch-all and upsert-all endpoints used by the page.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use linkcard_core::Snapshot;

use crate::error::DataError;
use crate::schema::data::SaveDataResponse;
use crate::state::AppState;

/// Returns the stored record.
///
/// `GET /api/get-data`
pub async fn get_data(State(state): State<AppState>) -> Result<Json<Snapshot>, DataError> {
    state
        .service
        .fetch_data()
        .await
        .map(Json)
        .map_err(|_| DataError::Fetch)
}

/// Overwrites the stored record with the request body.
///
/// `POST /api/save-data`
pub async fn save_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveDataResponse>, DataError> {
    let snapshot: Snapshot = serde_json::from_slice(&body).map_err(|err| {
        tracing::error!(error = %err, "save-data body is not a snapshot");
        DataError::Save
    })?;
    state
        .service
        .save_data(snapshot)
        .await
        .map_err(|_| DataError::Save)?;
    Ok(Json(SaveDataResponse::saved()))
}

/// Any method other than POST on the save endpoint.
pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
