use std::time::Duration;

use async_trait::async_trait;
use deadpool_diesel::postgres::Pool;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::model::{InsertableTranslation, TranslationRecord};
use super::schema::translations;

const CREATE_TRANSLATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS translations (
    id SERIAL PRIMARY KEY,
    original_message TEXT NOT NULL,
    translated_message TEXT NOT NULL,
    language VARCHAR(50) NOT NULL,
    model VARCHAR(50) NOT NULL,
    ranking INT DEFAULT 0,
    rating FLOAT CHECK (rating BETWEEN 0 AND 5) DEFAULT 0,
    classification VARCHAR(50),
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
ALTER TABLE translations ADD COLUMN IF NOT EXISTS classification VARCHAR(50);
";

/// Storage failures. Callers only ever see a generic message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database pool error -- {0:?}")]
    Pool(deadpool_diesel::PoolError),
    #[error("database interaction error -- {0:?}")]
    Interaction(deadpool_diesel::InteractError),
    #[error("database error -- {0:?}")]
    Database(diesel::result::Error),
    #[error("store unavailable -- {0}")]
    Unavailable(String),
}

impl From<deadpool_diesel::PoolError> for StoreError {
    fn from(value: deadpool_diesel::PoolError) -> Self {
        Self::Pool(value)
    }
}

impl From<deadpool_diesel::InteractError> for StoreError {
    fn from(value: deadpool_diesel::InteractError) -> Self {
        Self::Interaction(value)
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Database(value)
    }
}

/// Persistence for [`TranslationRecord`]s. Rows are only ever appended.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates the `translations` table when it does not exist yet.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    async fn insert(&self, row: InsertableTranslation) -> Result<TranslationRecord, StoreError>;

    /// Every stored row, ordered by id.
    async fn all(&self) -> Result<Vec<TranslationRecord>, StoreError>;
}

pub struct PgRecordStore {
    pool: Pool,
}

impl PgRecordStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Periodically drops pooled connections unused for longer than `idle_timeout`.
    pub fn spawn_idle_reaper(&self, idle_timeout: Duration) -> tokio::task::JoinHandle<()> {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(idle_timeout);
            loop {
                interval.tick().await;
                let result = pool.retain(|_, metrics| metrics.last_used() < idle_timeout);
                if !result.removed.is_empty() {
                    debug!(removed = result.removed.len(), "closed idle database connections");
                }
            }
        })
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get().await?;
        conn.interact(|conn| conn.batch_execute(CREATE_TRANSLATIONS_TABLE))
            .await??;

        info!("table \"translations\" is ready");
        Ok(())
    }

    async fn insert(&self, row: InsertableTranslation) -> Result<TranslationRecord, StoreError> {
        let conn = self.pool.get().await?;
        let record = conn
            .interact(move |conn| {
                diesel::insert_into(translations::table)
                    .values(&row)
                    .returning(TranslationRecord::as_returning())
                    .get_result(conn)
            })
            .await??;

        Ok(record)
    }

    async fn all(&self) -> Result<Vec<TranslationRecord>, StoreError> {
        let conn = self.pool.get().await?;
        let records = conn
            .interact(|conn| {
                translations::table
                    .order(translations::id.asc())
                    .select(TranslationRecord::as_select())
                    .load(conn)
            })
            .await??;

        Ok(records)
    }
}

/// Process-local store for tests and `record_service --in-memory`.
#[derive(Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Vec<TranslationRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, row: InsertableTranslation) -> Result<TranslationRecord, StoreError> {
        let mut rows = self.rows.write().await;
        let id = i32::try_from(rows.len() + 1)
            .map_err(|_| StoreError::Unavailable("id space exhausted".to_string()))?;

        let record = TranslationRecord {
            id,
            original_message: row.original_message,
            translated_message: row.translated_message,
            language: row.language,
            model: row.model,
            ranking: row.ranking,
            rating: row.rating,
            classification: row.classification,
            created_at: chrono::Utc::now().naive_utc(),
        };
        rows.push(record.clone());

        Ok(record)
    }

    async fn all(&self) -> Result<Vec<TranslationRecord>, StoreError> {
        Ok(self.rows.read().await.clone())
    }
}
