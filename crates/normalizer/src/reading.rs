//! Station readings

use crate::Measurement;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use thresholds::Category;

/// Offset of provider timestamps that carry no zone (Asia/Taipei)
const PROVIDER_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// One category's measurement from one station, for one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    pub station_id: String,
    pub station_name: String,
    pub category: Category,
    pub value: Measurement,
    pub observed_at: Option<DateTime<Utc>>,
}

impl StationReading {
    /// Valid value, if any
    pub fn valid_value(&self) -> Option<f64> {
        self.value.value()
    }
}

/// Parse a provider timestamp
///
/// Accepts RFC 3339 (`2024-06-01T14:00:00+08:00`) and the zone-less
/// `2024-06-01 14:00:00` form, which is taken as provider local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y/%m/%d %H:%M:%S"))
        .ok()?;
    let offset = FixedOffset::east_opt(PROVIDER_UTC_OFFSET_SECS)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
