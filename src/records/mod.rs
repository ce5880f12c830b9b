//! The `translations` table: row types, CSV export, storage backends and the
//! HTTP client used to reach the record service.

pub mod client;
pub mod export;
pub mod model;
pub mod schema;
pub mod store;

pub use client::RecordClient;
pub use export::{CSV_HEADER, render_csv};
pub use model::{InsertableTranslation, NewTranslationRecord, RecordRejection, TranslationRecord};
pub use store::{MemoryRecordStore, PgRecordStore, RecordStore, StoreError};
