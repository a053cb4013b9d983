//! Record building and fire-and-forget persistence

use crate::CycleOutcome;
use alerting::{PumpActivity, PumpStatus};
use chrono::{DateTime, Utc};
use normalizer::{PumpStationReading, RainfallStation, WeatherObservation};
use std::sync::Arc;
use storage::{AlertLogDraft, ObservationRecorder, WaterLevelRecord, WeatherObservationRecord};
use thresholds::{Category, ThresholdRegistry};
use tracing::{debug, error, info};

/// Everything a cycle hands to the recorder
#[derive(Debug, Clone, Default)]
pub(crate) struct PersistBatch {
    pub weather: Vec<WeatherObservationRecord>,
    pub water_level: Option<WaterLevelRecord>,
    pub alerts: Vec<AlertLogDraft>,
}

/// One row per station; the gust observation is folded into its station's
/// rainfall row when both were fetched
pub(crate) fn weather_records(
    rainfall: &[RainfallStation],
    observation: Option<&WeatherObservation>,
    evaluated_at: DateTime<Utc>,
) -> Vec<WeatherObservationRecord> {
    let mut records: Vec<_> = rainfall
        .iter()
        .map(|station| {
            let mut record = WeatherObservationRecord::empty(
                &station.station_id,
                &station.station_name,
                station.observed_at.unwrap_or(evaluated_at),
            );
            record.town_name = station.town_name.clone();
            record.rain_1hr = station.rain_1hr.value();
            record.rain_24hr = station.rain_24hr.value();
            record
        })
        .collect();

    if let Some(obs) = observation {
        let index = match records.iter().position(|r| r.station_id == obs.station_id) {
            Some(i) => i,
            None => {
                records.push(WeatherObservationRecord::empty(
                    &obs.station_id,
                    &obs.station_name,
                    obs.observed_at.unwrap_or(evaluated_at),
                ));
                records.len() - 1
            }
        };

        let record = &mut records[index];
        if record.town_name.is_none() {
            record.town_name = obs.town_name.clone();
        }
        record.temperature = obs.temperature.value();
        record.humidity = obs.humidity.value();
        record.wind_speed = obs.wind_speed.value();
        record.wind_direction = obs.wind_direction.value();
        record.gust_speed = obs.gust_speed.value();
        record.air_pressure = obs.air_pressure.value();
        record.weather = obs.weather.clone();
    }

    records
}

pub(crate) fn water_level_record(
    reading: &PumpStationReading,
    evaluated_at: DateTime<Utc>,
) -> WaterLevelRecord {
    WaterLevelRecord {
        station_id: reading.station_id.clone(),
        station_name: reading.station_name.clone(),
        observed_at: reading.observed_at.unwrap_or(evaluated_at),
        inner_level: reading.inner_level.value(),
        outer_level: reading.outer_level.value(),
        pump_count: Some(reading.pump_count),
        gate_status: reading.gate_status.clone(),
        warning_status: reading
            .inner_level
            .value()
            .map(|level| PumpStatus::from_inner_level(level).to_string()),
        pump_status: Some(PumpActivity::from_count(reading.pump_count).to_string()),
    }
}

/// Alert log drafts, attributed to the station behind each category
///
/// Rainfall alerts come from the group average and carry no station.
pub(crate) fn alert_drafts(
    outcome: &CycleOutcome,
    registry: &ThresholdRegistry,
) -> Vec<AlertLogDraft> {
    outcome
        .alerts
        .iter()
        .map(|alert| {
            let (station_id, station_name) = match alert.category {
                Category::Rain1Hr | Category::Rain24Hr => (None, None),
                Category::WindGust => outcome
                    .gust
                    .as_ref()
                    .map(|g| (Some(g.station_id.clone()), Some(g.station_name.clone())))
                    .unwrap_or((None, None)),
                Category::WaterLevel => outcome
                    .pump
                    .as_ref()
                    .map(|p| (Some(p.station_id.clone()), Some(p.station_name.clone())))
                    .unwrap_or((None, None)),
            };
            AlertLogDraft {
                alert: alert.clone(),
                station_id,
                station_name,
                message: alert.message(&registry.get(alert.category).unit),
            }
        })
        .collect()
}

/// Write a batch; each step is attempted regardless of earlier failures
pub(crate) async fn persist(
    recorder: Arc<dyn ObservationRecorder>,
    batch: PersistBatch,
    evaluated_at: DateTime<Utc>,
) {
    if !batch.weather.is_empty() {
        let count = batch.weather.len();
        match recorder.record_weather(batch.weather).await {
            Ok(()) => debug!("Stored {} weather records", count),
            Err(e) => error!("Failed to store weather records: {}", e),
        }
    }

    if let Some(record) = batch.water_level {
        if let Err(e) = recorder.record_water_level(record).await {
            error!("Failed to store water level record: {}", e);
        }
    }

    match recorder.sync_alerts(batch.alerts, evaluated_at).await {
        Ok(summary) if summary.triggered + summary.resolved > 0 => info!(
            "Alert log: {} triggered, {} resolved",
            summary.triggered, summary.resolved
        ),
        Ok(_) => {}
        Err(e) => error!("Failed to sync alert log: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use normalizer::{Measurement, ValidationError};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap()
    }

    fn rainfall(id: &str, name: &str, rain: f64) -> RainfallStation {
        RainfallStation {
            station_id: id.to_string(),
            station_name: name.to_string(),
            town_name: Some("中正區".to_string()),
            observed_at: None,
            rain_1hr: Measurement::Valid(rain),
            rain_24hr: Measurement::Invalid(ValidationError::Sentinel(-998.0)),
        }
    }

    fn observation(id: &str, name: &str) -> WeatherObservation {
        WeatherObservation {
            station_id: id.to_string(),
            station_name: name.to_string(),
            town_name: None,
            observed_at: Some(now()),
            temperature: Measurement::Valid(28.4),
            humidity: Measurement::Valid(80.0),
            wind_speed: Measurement::Valid(3.2),
            wind_direction: Measurement::Invalid(ValidationError::Missing),
            gust_speed: Measurement::Valid(12.1),
            gust_occurred_at: None,
            air_pressure: Measurement::Valid(1005.3),
            weather: Some("陰".to_string()),
        }
    }

    #[test]
    fn test_observation_folded_into_rainfall_row() {
        let records = weather_records(
            &[rainfall("466920", "臺北", 3.5), rainfall("C0A980", "社子", 1.0)],
            Some(&observation("466920", "臺北")),
            now(),
        );

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rain_1hr, Some(3.5));
        assert_eq!(records[0].rain_24hr, None);
        assert_eq!(records[0].gust_speed, Some(12.1));
        assert_eq!(records[0].wind_direction, None);
        assert_eq!(records[0].observed_at, now());
        assert_eq!(records[1].gust_speed, None);
    }

    #[test]
    fn test_observation_from_other_station_gets_own_row() {
        let records = weather_records(
            &[rainfall("C0A980", "社子", 1.0)],
            Some(&observation("C0A9F0", "內湖")),
            now(),
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].station_id, "C0A9F0");
        assert_eq!(records[1].rain_1hr, None);
    }

    fn pump_reading(inner_level: Measurement, pump_count: u32) -> PumpStationReading {
        PumpStationReading {
            station_id: "108".to_string(),
            station_name: "中山抽水站".to_string(),
            district: None,
            address: None,
            observed_at: None,
            inner_level,
            outer_level: Measurement::Invalid(ValidationError::Missing),
            pump_count,
            gate_status: None,
        }
    }

    #[test]
    fn test_water_level_record_warning_status_follows_inner_level() {
        let record = water_level_record(&pump_reading(Measurement::Valid(2.1), 0), now());
        assert_eq!(record.inner_level, Some(2.1));
        assert_eq!(record.outer_level, None);
        assert_eq!(record.warning_status.as_deref(), Some("WARNING"));
        assert_eq!(record.pump_status.as_deref(), Some("STANDBY"));
        assert_eq!(record.observed_at, now());

        let record = water_level_record(&pump_reading(Measurement::Valid(2.6), 3), now());
        assert_eq!(record.warning_status.as_deref(), Some("DANGER"));

        let record = water_level_record(&pump_reading(Measurement::Valid(2.7), 3), now());
        assert_eq!(record.warning_status.as_deref(), Some("DANGER"));
        assert_eq!(record.pump_status.as_deref(), Some("RUNNING"));

        let record = water_level_record(&pump_reading(Measurement::Valid(1.2), 0), now());
        assert_eq!(record.warning_status.as_deref(), Some("NORMAL"));
    }

    #[test]
    fn test_invalid_inner_level_has_no_warning_status() {
        let reading = pump_reading(Measurement::Invalid(ValidationError::Sentinel(-999.0)), 1);
        let record = water_level_record(&reading, now());
        assert_eq!(record.inner_level, None);
        assert_eq!(record.warning_status, None);
        assert_eq!(record.pump_status.as_deref(), Some("RUNNING"));
    }
}
