//! Evaluated cycle results

use alerting::{AggregatedMetric, AlertSet, PumpActivity, PumpStatus, Severity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Gust observation used for the wind category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GustSummary {
    pub station_id: String,
    pub station_name: String,
    /// m/s; `None` when the station reported no valid gust
    pub gust_speed: Option<f64>,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Monitored pump station state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PumpSummary {
    pub station_id: String,
    pub station_name: String,
    /// m
    pub inner_level: Option<f64>,
    /// m
    pub outer_level: Option<f64>,
    pub pump_count: u32,
    /// `None` when the inner level is invalid
    pub status: Option<PumpStatus>,
    pub activity: PumpActivity,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Everything one cycle evaluated
///
/// Absent categories (`None`) mean the fetch failed or no valid reading
/// came back; they never raise alerts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleOutcome {
    pub cycle_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub rain_1hr: Option<AggregatedMetric>,
    pub rain_24hr: Option<AggregatedMetric>,
    pub gust: Option<GustSummary>,
    pub pump: Option<PumpSummary>,
    pub alerts: AlertSet,
    /// Whether administrative threshold overrides were in effect
    pub thresholds_overridden: bool,
}

impl CycleOutcome {
    /// Highest severity raised; `None` means normal
    pub fn overall(&self) -> Option<Severity> {
        self.alerts.overall()
    }
}
