//! Form state and the actions behind the comparison front end.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::future::join_all;
use indexmap::IndexMap;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::core::error::{ClipboardError, RuntimeError, SessionError};
use crate::core::traits::Clipboard;
use crate::core::types::{Classification, ModelCatalog};
use crate::records::{NewTranslationRecord, RecordClient};
use crate::runtime::ProviderRuntime;

pub mod clipboard;

pub const EMPTY_MESSAGE_ERROR: &str = "Please enter the message.";
pub const TRANSLATION_FAILED_ERROR: &str = "Translation failed. Please try again.";
pub const EXPORT_FAILED_ERROR: &str = "Failed to export data. Please try again.";
pub const EXPORT_FILE_NAME: &str = "output_file.csv";
pub const COPIED_NOTICE_DURATION: Duration = Duration::from_millis(3_000);

pub const DEFAULT_LANGUAGE: &str = "French";

/// Languages offered by the form. Korean and Arabic have no DeepL target.
pub const FORM_LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Dutch",
    "Russian",
    "Chinese (Simplified)",
    "Japanese",
    "Korean",
    "Arabic",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormData {
    pub language: String,
    pub message: String,
    pub classification: Classification,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            message: String::new(),
            classification: Classification::Translation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Language,
    Message,
    Classification,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub completed: usize,
    pub failed: usize,
    /// Models that cannot handle the selected classification.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub saved: usize,
    pub failed: usize,
}

pub struct ComparisonSession {
    runtime: ProviderRuntime,
    records: RecordClient,
    form: FormData,
    translations: IndexMap<String, String>,
    rankings: IndexMap<String, i32>,
    ratings: IndexMap<String, f64>,
    failures: IndexMap<String, String>,
    error: Option<String>,
    loading: bool,
    copied_until: Option<Instant>,
}

impl ComparisonSession {
    pub fn new(runtime: ProviderRuntime, records: RecordClient) -> Self {
        Self {
            runtime,
            records,
            form: FormData::default(),
            translations: IndexMap::new(),
            rankings: IndexMap::new(),
            ratings: IndexMap::new(),
            failures: IndexMap::new(),
            error: None,
            loading: false,
            copied_until: None,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        self.runtime.catalog()
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn translations(&self) -> &IndexMap<String, String> {
        &self.translations
    }

    pub fn rankings(&self) -> &IndexMap<String, i32> {
        &self.rankings
    }

    pub fn ratings(&self) -> &IndexMap<String, f64> {
        &self.ratings
    }

    /// Error text per model from the last generate run.
    pub fn failures(&self) -> &IndexMap<String, String> {
        &self.failures
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn copied_notice_visible(&self) -> bool {
        self.copied_until
            .is_some_and(|deadline| Instant::now() < deadline)
    }

    /// Replaces one form field and clears the current error.
    pub fn update_form(&mut self, field: FormField, value: &str) {
        match field {
            FormField::Language => self.form.language = value.to_string(),
            FormField::Message => self.form.message = value.to_string(),
            FormField::Classification => {
                self.form.classification = Classification::from_input(value);
            }
        }
        self.error = None;
    }

    pub fn set_ranking(&mut self, model: &str, value: i32) {
        self.rankings.insert(model.to_string(), value);
    }

    pub fn set_rating(&mut self, model: &str, value: f64) {
        self.ratings.insert(model.to_string(), value);
    }

    /// Runs every catalog model in order, one at a time.
    ///
    /// A failing model is logged and recorded in [`Self::failures`]; the
    /// remaining models still run. Models that cannot serve the selected
    /// classification are skipped without an entry.
    pub async fn generate(&mut self) -> Result<GenerateReport, SessionError> {
        if self.form.message.trim().is_empty() {
            self.error = Some(EMPTY_MESSAGE_ERROR.to_string());
            return Err(SessionError::Validation {
                message: EMPTY_MESSAGE_ERROR.to_string(),
            });
        }

        self.error = None;
        self.translations.clear();
        self.failures.clear();
        self.loading = true;

        let model_ids = self
            .runtime
            .catalog()
            .model_ids()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut report = GenerateReport::default();
        for model_id in model_ids {
            let result = self
                .runtime
                .translate(
                    &model_id,
                    &self.form.message,
                    &self.form.language,
                    self.form.classification,
                )
                .await;

            match result {
                Ok(response) => {
                    self.translations.insert(model_id, response.text);
                    report.completed += 1;
                }
                Err(RuntimeError::CapabilityMismatch { capability, .. }) => {
                    debug!(model = %model_id, %capability, "skipping model");
                    report.skipped += 1;
                }
                Err(error) => {
                    warn!(model = %model_id, %error, "translation failed");
                    self.failures.insert(model_id, error.to_string());
                    self.error = Some(TRANSLATION_FAILED_ERROR.to_string());
                    report.failed += 1;
                }
            }
        }

        self.loading = false;
        info!(
            completed = report.completed,
            failed = report.failed,
            skipped = report.skipped,
            "generate finished"
        );

        Ok(report)
    }

    /// One insert payload per catalog model, in catalog order.
    pub fn pending_records(&self) -> Vec<NewTranslationRecord> {
        self.runtime
            .catalog()
            .model_ids()
            .map(|model_id| NewTranslationRecord {
                original_message: Some(self.form.message.clone()),
                translated_message: self.translations.get(model_id).cloned(),
                language: Some(self.form.language.clone()),
                model: Some(model_id.to_string()),
                ranking: self.rankings.get(model_id).copied(),
                rating: self.ratings.get(model_id).copied(),
                classification: Some(self.form.classification.as_str().to_string()),
            })
            .collect()
    }

    /// Sends every pending record at once. Each failure is logged on its own.
    pub async fn submit(&self) -> SubmitReport {
        let records = self.pending_records();
        let results = join_all(records.iter().map(|record| self.records.insert(record))).await;

        let mut report = SubmitReport::default();
        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(stored) => {
                    debug!(id = stored.id, model = %stored.model, "saved translation record");
                    report.saved += 1;
                }
                Err(error) => {
                    warn!(model = ?record.model, %error, "failed to save translation record");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Downloads the service's CSV export into `dir`.
    pub async fn export_to_csv(&mut self, dir: &Path) -> Result<PathBuf, SessionError> {
        match self.download_export(dir).await {
            Ok(path) => Ok(path),
            Err(error) => {
                warn!(%error, "export failed");
                self.error = Some(EXPORT_FAILED_ERROR.to_string());
                Err(error)
            }
        }
    }

    async fn download_export(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        let bytes = self.records.export_csv().await?;
        let path = dir.join(EXPORT_FILE_NAME);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Copies the translations as pretty JSON and shows the copied notice.
    pub fn copy_to_clipboard(&mut self, clipboard: &mut dyn Clipboard) -> Result<(), SessionError> {
        let rendered = serde_json::to_string_pretty(&self.translations)
            .map_err(|error| ClipboardError::Unavailable(error.to_string()));

        match rendered.and_then(|text| clipboard.write_text(&text)) {
            Ok(()) => {
                self.copied_until = Some(Instant::now() + COPIED_NOTICE_DURATION);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "failed to copy");
                Err(error.into())
            }
        }
    }
}
