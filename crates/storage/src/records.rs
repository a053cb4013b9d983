//! Persisted record shapes

use alerting::{Alert, AlertKey, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thresholds::Category;

/// Weather observation row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservationRecord {
    pub station_id: String,
    pub station_name: String,
    pub town_name: Option<String>,
    pub observed_at: DateTime<Utc>,
    /// °C
    pub temperature: Option<f64>,
    /// %
    pub humidity: Option<f64>,
    /// m/s
    pub wind_speed: Option<f64>,
    /// Degrees; `None` when the heading is unknown
    pub wind_direction: Option<f64>,
    /// m/s
    pub gust_speed: Option<f64>,
    /// hPa
    pub air_pressure: Option<f64>,
    /// mm
    pub rain_1hr: Option<f64>,
    /// mm
    pub rain_24hr: Option<f64>,
    pub weather: Option<String>,
}

impl WeatherObservationRecord {
    /// Record with only identity and time set
    pub fn empty(station_id: &str, station_name: &str, observed_at: DateTime<Utc>) -> Self {
        Self {
            station_id: station_id.to_string(),
            station_name: station_name.to_string(),
            town_name: None,
            observed_at,
            temperature: None,
            humidity: None,
            wind_speed: None,
            wind_direction: None,
            gust_speed: None,
            air_pressure: None,
            rain_1hr: None,
            rain_24hr: None,
            weather: None,
        }
    }
}

/// Pump-station water level row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterLevelRecord {
    pub station_id: String,
    pub station_name: String,
    pub observed_at: DateTime<Utc>,
    /// m
    pub inner_level: Option<f64>,
    /// m
    pub outer_level: Option<f64>,
    pub pump_count: Option<u32>,
    pub gate_status: Option<String>,
    /// Inner-level bucket (`NORMAL`, `WARNING`, `DANGER`); `None` when the
    /// inner level is invalid
    pub warning_status: Option<String>,
    /// `RUNNING` or `STANDBY`
    pub pump_status: Option<String>,
}

/// An alert about to be logged, with the station it concerns
#[derive(Debug, Clone, PartialEq)]
pub struct AlertLogDraft {
    pub alert: Alert,
    pub station_id: Option<String>,
    pub station_name: Option<String>,
    pub message: String,
}

/// Alert log row, triggered then resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLogRecord {
    pub id: i64,
    pub alert_type: Category,
    pub severity: Severity,
    pub station_id: Option<String>,
    pub station_name: Option<String>,
    pub trigger_value: f64,
    pub threshold: f64,
    pub message: String,
    pub is_active: bool,
    pub triggered_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AlertLogRecord {
    pub fn key(&self) -> AlertKey {
        AlertKey {
            category: self.alert_type,
            severity: self.severity,
        }
    }
}

/// Outcome of one alert-log sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertSyncSummary {
    pub triggered: usize,
    pub resolved: usize,
}
