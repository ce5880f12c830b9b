use super::model::TranslationRecord;

/// Column order of the `translations` table, used as the export header.
pub const CSV_HEADER: [&str; 9] = [
    "id",
    "original_message",
    "translated_message",
    "language",
    "model",
    "ranking",
    "rating",
    "classification",
    "created_at",
];

/// Renders rows as CSV with a header line. Nulls become empty fields.
pub fn render_csv(records: &[TranslationRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in records {
        writer.write_record([
            record.id.to_string(),
            record.original_message.clone(),
            record.translated_message.clone(),
            record.language.clone(),
            record.model.clone(),
            record.ranking.map(|value| value.to_string()).unwrap_or_default(),
            record.rating.map(|value| value.to_string()).unwrap_or_default(),
            record.classification.clone().unwrap_or_default(),
            record.created_at.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|error| csv::Error::from(error.into_error()))
}
