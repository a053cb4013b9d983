//! Storage Layer
//!
//! Observation recorder interface, persisted record shapes, and an
//! in-memory repository implementing it.

mod records;
mod repository;

pub use records::{
    AlertLogDraft, AlertLogRecord, AlertSyncSummary, WaterLevelRecord, WeatherObservationRecord,
};
pub use repository::Repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use thresholds::ThresholdError;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found")]
    NotFound,
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(#[from] ThresholdError),
}

/// Persists the normalized observations and alert log of each cycle
///
/// Callers treat every method as fire-and-forget: a failure here never
/// changes an evaluation result that has already been produced.
#[async_trait]
pub trait ObservationRecorder: Send + Sync {
    async fn record_weather(
        &self,
        records: Vec<WeatherObservationRecord>,
    ) -> Result<(), StorageError>;

    async fn record_water_level(&self, record: WaterLevelRecord) -> Result<(), StorageError>;

    /// Open log entries for new `(category, severity)` pairs and resolve
    /// active entries that are no longer raised
    async fn sync_alerts(
        &self,
        current: Vec<AlertLogDraft>,
        now: DateTime<Utc>,
    ) -> Result<AlertSyncSummary, StorageError>;
}
