use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use super::model::{NewTranslationRecord, TranslationRecord};
use crate::core::error::{ConfigError, RecordsError};

pub const DEFAULT_RECORD_SERVICE_URL: &str = "http://127.0.0.1:5000";

/// HTTP client for the record service's `/api` routes.
#[derive(Debug, Clone)]
pub struct RecordClient {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl RecordClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, ConfigError> {
        Self::with_client(reqwest::Client::new(), base_url, timeout_ms)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout { timeout_ms });
        }

        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = if trimmed.is_empty() {
            DEFAULT_RECORD_SERVICE_URL.to_string()
        } else {
            trimmed.to_string()
        };

        Ok(Self {
            client,
            base_url,
            timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/translations`. Expects `201 Created` with the stored row.
    pub async fn insert(
        &self,
        record: &NewTranslationRecord,
    ) -> Result<TranslationRecord, RecordsError> {
        let url = format!("{}/api/translations", self.base_url);
        debug!(model = ?record.model, "submitting translation record");

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .json(record)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(status_error(status, response).await);
        }

        response
            .json::<TranslationRecord>()
            .await
            .map_err(|error| RecordsError::Serialization {
                message: error.to_string(),
            })
    }

    /// `GET /api/export`. Returns the raw CSV bytes.
    pub async fn export_csv(&self) -> Result<Vec<u8>, RecordsError> {
        let url = format!("{}/api/export", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }
}

fn transport_error(error: reqwest::Error) -> RecordsError {
    RecordsError::Transport {
        message: error.to_string(),
    }
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> RecordsError {
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        Ok(_) => format!("http status {}", status.as_u16()),
        Err(error) => format!("http status {}; failed to read response body: {error}", status.as_u16()),
    };

    RecordsError::Status {
        status_code: status.as_u16(),
        message,
    }
}
