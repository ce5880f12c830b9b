use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::schema::translations;

/// One stored comparison result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = translations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TranslationRecord {
    pub id: i32,
    pub original_message: String,
    pub translated_message: String,
    pub language: String,
    pub model: String,
    pub ranking: Option<i32>,
    pub rating: Option<f64>,
    pub classification: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Insert payload as it arrives on the wire. Every field may be absent; the
/// service decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewTranslationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "language must be at most 50 characters"))]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "model must be at most 50 characters"))]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 8, message = "ranking must be between 0 and 8"))]
    pub ranking: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "classification must be at most 50 characters"))]
    pub classification: Option<String>,
}

/// Row values ready for `INSERT`. Absent ranking and rating become 0.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = translations)]
pub struct InsertableTranslation {
    pub original_message: String,
    pub translated_message: String,
    pub language: String,
    pub model: String,
    pub ranking: Option<i32>,
    pub rating: Option<f64>,
    pub classification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordRejection {
    #[error("Missing required fields")]
    MissingFields,
    #[error("{0}")]
    Invalid(String),
}

impl From<validator::ValidationErrors> for RecordRejection {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages = err
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter().map(ToString::to_string))
            .collect::<Vec<String>>();
        messages.sort();

        Self::Invalid(messages.join("\n"))
    }
}

impl NewTranslationRecord {
    /// Checks the four required fields are present and non-empty, then the
    /// value ranges.
    pub fn to_insertable(self) -> Result<InsertableTranslation, RecordRejection> {
        let required = [
            &self.original_message,
            &self.translated_message,
            &self.language,
            &self.model,
        ];
        if required
            .iter()
            .any(|value| value.as_deref().is_none_or(str::is_empty))
        {
            return Err(RecordRejection::MissingFields);
        }

        self.validate()?;

        Ok(InsertableTranslation {
            original_message: self.original_message.unwrap_or_default(),
            translated_message: self.translated_message.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            ranking: Some(self.ranking.unwrap_or(0)),
            rating: Some(self.rating.unwrap_or(0.0)),
            classification: self.classification,
        })
    }
}
