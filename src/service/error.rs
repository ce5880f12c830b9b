use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::records::{RecordRejection, StoreError};

/// Errors surfaced by the record service handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// One of the four required fields was absent or empty
    #[error("Missing required fields")]
    MissingFields,
    /// A field was present but out of range
    #[error("{0}")]
    Validation(String),
    /// Writing the row failed
    #[error("Database insertion error")]
    Storage(StoreError),
    /// Reading or serialising rows for export failed
    #[error("Internal Server Error")]
    Export(String),
}

impl From<RecordRejection> for ServiceError {
    fn from(value: RecordRejection) -> Self {
        match value {
            RecordRejection::MissingFields => Self::MissingFields,
            RecordRejection::Invalid(message) => Self::Validation(message),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingFields | Self::Validation(_) => {
                let body = serde_json::json!({ "error": self.to_string() });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::Storage(ref source) => {
                error!("database insertion error -- {source}");
                let body = serde_json::json!({ "error": self.to_string() });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            Self::Export(ref detail) => {
                error!("error exporting to csv -- {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}
