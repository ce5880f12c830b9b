//! Handlers for the `/api` routes.

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::instrument;

use super::AppState;
use super::error::ServiceError;
use crate::records::{NewTranslationRecord, render_csv};

pub(crate) const EXPORT_FILE_NAME: &str = "output_file.csv";

/// Liveness probe.
pub(crate) async fn healthcheck() -> impl IntoResponse {
    StatusCode::OK
}

/// Validate and store a single comparison result.
#[instrument(skip(state))]
pub(crate) async fn create_translation(
    State(state): State<AppState>,
    Json(request): Json<NewTranslationRecord>,
) -> Result<impl IntoResponse, ServiceError> {
    let row = request.to_insertable()?;

    let record = state.store.insert(row).await.map_err(ServiceError::Storage)?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Dump every stored row as a CSV attachment.
#[instrument(skip(state))]
pub(crate) async fn export_translations(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let records = state
        .store
        .all()
        .await
        .map_err(|error| ServiceError::Export(error.to_string()))?;

    let csv = render_csv(&records).map_err(|error| ServiceError::Export(error.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        csv,
    ))
}
