//! Repository Implementation

use crate::{
    AlertLogDraft, AlertLogRecord, AlertSyncSummary, ObservationRecorder, StorageError,
    WaterLevelRecord, WeatherObservationRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use thresholds::{Category, ThresholdError, ThresholdSet, ThresholdStore};
use tracing::{debug, info};

/// Repository for data access (in-memory implementation)
pub struct Repository {
    /// Weather observations, oldest first
    weather_log: Mutex<VecDeque<WeatherObservationRecord>>,
    /// Water level observations, oldest first
    water_log: Mutex<VecDeque<WaterLevelRecord>>,
    /// Alert log, oldest first
    alert_log: Mutex<VecDeque<AlertLogRecord>>,
    /// Administrative threshold overrides
    thresholds: Mutex<BTreeMap<Category, ThresholdSet>>,
    /// Max observation records per log (about a month of 5-minute cycles)
    max_observation_records: usize,
    /// Max alert log records
    max_alert_records: usize,
    /// Next alert log ID
    next_alert_id: Mutex<i64>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
}

impl Repository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self {
            weather_log: Mutex::new(VecDeque::with_capacity(1000)),
            water_log: Mutex::new(VecDeque::with_capacity(1000)),
            alert_log: Mutex::new(VecDeque::with_capacity(100)),
            thresholds: Mutex::new(BTreeMap::new()),
            max_observation_records: 30 * 24 * 12 * 3,
            max_alert_records: 10_000,
            next_alert_id: Mutex::new(1),
        }
    }

    /// Insert a weather observation
    pub fn insert_weather(&self, record: WeatherObservationRecord) -> Result<(), StorageError> {
        let mut log = lock(&self.weather_log)?;
        while log.len() >= self.max_observation_records {
            log.pop_front();
        }
        log.push_back(record);
        Ok(())
    }

    /// Insert a water level observation
    pub fn insert_water_level(&self, record: WaterLevelRecord) -> Result<(), StorageError> {
        let mut log = lock(&self.water_log)?;
        while log.len() >= self.max_observation_records {
            log.pop_front();
        }
        log.push_back(record);
        Ok(())
    }

    /// Weather observations since a time, newest first, optionally for one station
    pub fn weather_history(
        &self,
        station_id: Option<&str>,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<WeatherObservationRecord>, StorageError> {
        let log = lock(&self.weather_log)?;
        Ok(log
            .iter()
            .rev()
            .filter(|r| r.observed_at >= since)
            .filter(|r| station_id.map_or(true, |id| r.station_id == id))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Water level observations since a time, newest first
    pub fn water_level_history(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<WaterLevelRecord>, StorageError> {
        let log = lock(&self.water_log)?;
        Ok(log
            .iter()
            .rev()
            .filter(|r| r.observed_at >= since)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Alert log entries that have not been resolved
    pub fn active_alerts(&self) -> Result<Vec<AlertLogRecord>, StorageError> {
        let log = lock(&self.alert_log)?;
        Ok(log.iter().filter(|r| r.is_active).cloned().collect())
    }

    /// Alert log, newest first
    pub fn alert_history(
        &self,
        active_only: bool,
        limit: usize,
    ) -> Result<Vec<AlertLogRecord>, StorageError> {
        let log = lock(&self.alert_log)?;
        Ok(log
            .iter()
            .rev()
            .filter(|r| !active_only || r.is_active)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Resolve one alert log entry by hand
    pub fn resolve_alert(&self, id: i64, now: DateTime<Utc>) -> Result<(), StorageError> {
        let mut log = lock(&self.alert_log)?;
        let record = log
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StorageError::NotFound)?;
        record.is_active = false;
        record.resolved_at.get_or_insert(now);
        Ok(())
    }

    /// Insert or replace the override for a category
    pub fn upsert_threshold(&self, set: ThresholdSet) -> Result<(), StorageError> {
        set.validate()?;
        let mut thresholds = lock(&self.thresholds)?;
        info!("Threshold override for {} updated", set.category);
        thresholds.insert(set.category, set);
        Ok(())
    }

    /// Drop the override for a category
    pub fn remove_threshold(&self, category: Category) -> Result<(), StorageError> {
        let mut thresholds = lock(&self.thresholds)?;
        thresholds.remove(&category).map(|_| ()).ok_or(StorageError::NotFound)
    }

    /// Get total weather observation count
    pub fn weather_count(&self) -> usize {
        self.weather_log.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Get total water level observation count
    pub fn water_level_count(&self) -> usize {
        self.water_log.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn sync_alert_log(
        &self,
        current: Vec<AlertLogDraft>,
        now: DateTime<Utc>,
    ) -> Result<AlertSyncSummary, StorageError> {
        let mut log = lock(&self.alert_log)?;
        let mut next_id = lock(&self.next_alert_id)?;
        let mut summary = AlertSyncSummary::default();

        let raised: HashSet<_> = current.iter().map(|d| d.alert.key()).collect();
        for record in log.iter_mut().filter(|r| r.is_active) {
            if !raised.contains(&record.key()) {
                record.is_active = false;
                record.resolved_at = Some(now);
                summary.resolved += 1;
                debug!(
                    "Alert {} resolved ({} {})",
                    record.id, record.alert_type, record.severity
                );
            }
        }

        let active: HashSet<_> = log.iter().filter(|r| r.is_active).map(|r| r.key()).collect();
        for draft in current {
            if active.contains(&draft.alert.key()) {
                continue;
            }

            if log.len() >= self.max_alert_records {
                log.pop_front();
            }

            let id = *next_id;
            *next_id += 1;
            debug!("Alert {} triggered: {}", id, draft.message);
            log.push_back(AlertLogRecord {
                id,
                alert_type: draft.alert.category,
                severity: draft.alert.severity,
                station_id: draft.station_id,
                station_name: draft.station_name,
                trigger_value: draft.alert.value,
                threshold: draft.alert.threshold,
                message: draft.message,
                is_active: true,
                triggered_at: now,
                resolved_at: None,
            });
            summary.triggered += 1;
        }

        Ok(summary)
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObservationRecorder for Repository {
    async fn record_weather(
        &self,
        records: Vec<WeatherObservationRecord>,
    ) -> Result<(), StorageError> {
        let count = records.len();
        for record in records {
            self.insert_weather(record)?;
        }
        debug!("Recorded {} weather observations", count);
        Ok(())
    }

    async fn record_water_level(&self, record: WaterLevelRecord) -> Result<(), StorageError> {
        self.insert_water_level(record)
    }

    async fn sync_alerts(
        &self,
        current: Vec<AlertLogDraft>,
        now: DateTime<Utc>,
    ) -> Result<AlertSyncSummary, StorageError> {
        self.sync_alert_log(current, now)
    }
}

#[async_trait]
impl ThresholdStore for Repository {
    async fn load_overrides(&self) -> Result<Vec<ThresholdSet>, ThresholdError> {
        let thresholds = self
            .thresholds
            .lock()
            .map_err(|e| ThresholdError::StoreUnavailable(format!("Lock error: {}", e)))?;
        Ok(thresholds.values().cloned().collect())
    }
}
