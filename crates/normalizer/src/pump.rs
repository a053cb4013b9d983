//! Taipei pump-station feed

use crate::cwa::{decode_entries, text, timestamp};
use crate::{normalize, DecodeError, FieldPolicy, Measurement, RawField, StationReading};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thresholds::Category;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Feed {
    Bare(Vec<Value>),
    Wrapped { data: Vec<Value> },
}

#[derive(Debug, Deserialize)]
struct RawPumpStation {
    stn_id: RawField,
    #[serde(default)]
    stn_name: Option<RawField>,
    #[serde(default)]
    district: Option<RawField>,
    #[serde(default)]
    address: Option<RawField>,
    #[serde(default)]
    inner_level: Option<RawField>,
    #[serde(default)]
    outer_level: Option<RawField>,
    #[serde(default)]
    pump_count: Option<RawField>,
    #[serde(default)]
    gate_status: Option<RawField>,
    #[serde(default)]
    time: Option<RawField>,
}

/// Current state of one pump station
#[derive(Debug, Clone, PartialEq)]
pub struct PumpStationReading {
    pub station_id: String,
    pub station_name: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
    pub inner_level: Measurement,
    pub outer_level: Measurement,
    pub pump_count: u32,
    pub gate_status: Option<String>,
}

impl PumpStationReading {
    /// Inner level reading fed to the classifier
    pub fn level_reading(&self) -> StationReading {
        StationReading {
            station_id: self.station_id.clone(),
            station_name: self.station_name.clone(),
            category: Category::WaterLevel,
            value: self.inner_level.clone(),
            observed_at: self.observed_at,
        }
    }
}

/// Decode the pump-station feed (bare array or `{"data": [...]}`)
pub fn decode_pump_stations(body: &str) -> Result<Vec<PumpStationReading>, DecodeError> {
    let entries = match serde_json::from_str::<Feed>(body)? {
        Feed::Bare(entries) | Feed::Wrapped { data: entries } => entries,
    };

    Ok(decode_entries::<RawPumpStation>(entries)
        .into_iter()
        .map(|raw| {
            let pump_count = normalize(raw.pump_count.as_ref(), FieldPolicy::COUNT)
                .value()
                .map_or(0, |n| n.round() as u32);
            PumpStationReading {
                station_id: raw.stn_id.as_text(),
                station_name: text(raw.stn_name).unwrap_or_default(),
                district: text(raw.district),
                address: text(raw.address),
                observed_at: timestamp(raw.time),
                inner_level: normalize(raw.inner_level.as_ref(), FieldPolicy::LEVEL),
                outer_level: normalize(raw.outer_level.as_ref(), FieldPolicy::LEVEL),
                pump_count,
                gate_status: text(raw.gate_status),
            }
        })
        .collect())
}
