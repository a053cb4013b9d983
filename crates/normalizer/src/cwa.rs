//! Central Weather Administration open-data payloads
//!
//! Rainfall comes from dataset `O-A0002-001`; station observations from
//! `O-A0003-001` (manned stations) or `O-A0001-001` (automatic stations),
//! which share one schema.

use crate::{
    normalize, parse_timestamp, DecodeError, FieldPolicy, Measurement, RawField, StationReading,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thresholds::Category;
use tracing::{debug, warn};

// ============================================================================
// Raw schema
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    success: String,
    #[serde(default)]
    records: Option<Records>,
}

#[derive(Debug, Deserialize)]
struct Records {
    #[serde(rename = "Station", default, deserialize_with = "null_as_default")]
    station: Vec<Value>,
}

/// Treat an explicit `null` like an absent key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ObsTime {
    #[serde(default)]
    date_time: Option<RawField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GeoInfo {
    #[serde(default)]
    town_name: Option<RawField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Precipitation {
    #[serde(default)]
    precipitation: Option<RawField>,
}

#[derive(Debug, Default, Deserialize)]
struct RainfallElement {
    #[serde(rename = "Past1hr", default, deserialize_with = "null_as_default")]
    past_1hr: Precipitation,
    #[serde(rename = "Past24hr", default, deserialize_with = "null_as_default")]
    past_24hr: Precipitation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRainfallStation {
    station_id: RawField,
    station_name: RawField,
    #[serde(default, deserialize_with = "null_as_default")]
    obs_time: ObsTime,
    #[serde(default, deserialize_with = "null_as_default")]
    geo_info: GeoInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    rainfall_element: RainfallElement,
}

#[derive(Debug, Default, Deserialize)]
struct OccurredAt {
    #[serde(rename = "DateTime", default)]
    date_time: Option<RawField>,
}

#[derive(Debug, Default, Deserialize)]
struct GustInfo {
    #[serde(rename = "PeakGustSpeed", default)]
    peak_gust_speed: Option<RawField>,
    #[serde(rename = "Occurred_at", default, deserialize_with = "null_as_default")]
    occurred_at: OccurredAt,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WeatherElement {
    #[serde(default)]
    weather: Option<RawField>,
    #[serde(default)]
    air_temperature: Option<RawField>,
    #[serde(default)]
    relative_humidity: Option<RawField>,
    #[serde(default)]
    wind_speed: Option<RawField>,
    #[serde(default)]
    wind_direction: Option<RawField>,
    #[serde(default)]
    air_pressure: Option<RawField>,
    #[serde(default, deserialize_with = "null_as_default")]
    gust_info: GustInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawObservationStation {
    station_id: RawField,
    station_name: RawField,
    #[serde(default, deserialize_with = "null_as_default")]
    obs_time: ObsTime,
    #[serde(default, deserialize_with = "null_as_default")]
    geo_info: GeoInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    weather_element: WeatherElement,
}

/// Station entries of a successful envelope
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, DecodeError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.success != "true" {
        return Err(DecodeError::Rejected(envelope.success));
    }
    Ok(decode_entries(envelope.records.map(|r| r.station).unwrap_or_default()))
}

/// Decode entries one by one; an entry whose shape is unusable is skipped
/// with a warning and the rest of the payload is kept
pub(crate) fn decode_entries<T: DeserializeOwned>(entries: Vec<Value>) -> Vec<T> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(station) => Some(station),
            Err(e) => {
                warn!("Skipping station entry {}: {}", i, e);
                None
            }
        })
        .collect()
}

/// Text of an optional field; numbers are rendered, other values dropped
pub(crate) fn text(field: Option<RawField>) -> Option<String> {
    field.map(|f| f.as_text()).filter(|t| !t.is_empty())
}

pub(crate) fn timestamp(field: Option<RawField>) -> Option<DateTime<Utc>> {
    text(field).as_deref().and_then(parse_timestamp)
}

// ============================================================================
// Decoded types
// ============================================================================

/// Rainfall accumulations reported by one station
#[derive(Debug, Clone, PartialEq)]
pub struct RainfallStation {
    pub station_id: String,
    pub station_name: String,
    pub town_name: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
    pub rain_1hr: Measurement,
    pub rain_24hr: Measurement,
}

impl RainfallStation {
    /// One reading per rainfall category
    pub fn readings(&self) -> [StationReading; 2] {
        [
            self.reading(Category::Rain1Hr, self.rain_1hr.clone()),
            self.reading(Category::Rain24Hr, self.rain_24hr.clone()),
        ]
    }

    fn reading(&self, category: Category, value: Measurement) -> StationReading {
        StationReading {
            station_id: self.station_id.clone(),
            station_name: self.station_name.clone(),
            category,
            value,
            observed_at: self.observed_at,
        }
    }
}

/// Full observation from one weather station
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub station_id: String,
    pub station_name: String,
    pub town_name: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
    pub temperature: Measurement,
    pub humidity: Measurement,
    pub wind_speed: Measurement,
    pub wind_direction: Measurement,
    pub gust_speed: Measurement,
    pub gust_occurred_at: Option<DateTime<Utc>>,
    pub air_pressure: Measurement,
    pub weather: Option<String>,
}

impl WeatherObservation {
    /// Gust reading fed to the classifier
    pub fn gust_reading(&self) -> StationReading {
        StationReading {
            station_id: self.station_id.clone(),
            station_name: self.station_name.clone(),
            category: Category::WindGust,
            value: self.gust_speed.clone(),
            observed_at: self.observed_at,
        }
    }
}

// ============================================================================
// Decoders
// ============================================================================

/// Decode an `O-A0002-001` response
pub fn decode_rainfall(body: &str) -> Result<Vec<RainfallStation>, DecodeError> {
    let stations: Vec<RawRainfallStation> = decode_envelope(body)?;
    Ok(stations
        .into_iter()
        .map(|raw| {
            let decoded = RainfallStation {
                rain_1hr: normalize(
                    raw.rainfall_element.past_1hr.precipitation.as_ref(),
                    FieldPolicy::RAINFALL,
                ),
                rain_24hr: normalize(
                    raw.rainfall_element.past_24hr.precipitation.as_ref(),
                    FieldPolicy::RAINFALL,
                ),
                observed_at: timestamp(raw.obs_time.date_time),
                town_name: text(raw.geo_info.town_name),
                station_id: raw.station_id.as_text(),
                station_name: raw.station_name.as_text(),
            };
            debug!(
                "Rainfall {}: 1hr {:?}, 24hr {:?}",
                decoded.station_id, decoded.rain_1hr, decoded.rain_24hr
            );
            decoded
        })
        .collect())
}

/// Decode an `O-A0003-001` / `O-A0001-001` response
pub fn decode_observations(body: &str) -> Result<Vec<WeatherObservation>, DecodeError> {
    let stations: Vec<RawObservationStation> = decode_envelope(body)?;
    Ok(stations
        .into_iter()
        .map(|raw| {
            let el = raw.weather_element;
            WeatherObservation {
                station_id: raw.station_id.as_text(),
                station_name: raw.station_name.as_text(),
                town_name: text(raw.geo_info.town_name),
                observed_at: timestamp(raw.obs_time.date_time),
                temperature: normalize(el.air_temperature.as_ref(), FieldPolicy::TEMPERATURE),
                humidity: normalize(el.relative_humidity.as_ref(), FieldPolicy::POSITIVE),
                wind_speed: normalize(el.wind_speed.as_ref(), FieldPolicy::SPEED),
                wind_direction: normalize(el.wind_direction.as_ref(), FieldPolicy::DIRECTION),
                gust_speed: normalize(el.gust_info.peak_gust_speed.as_ref(), FieldPolicy::SPEED),
                gust_occurred_at: timestamp(el.gust_info.occurred_at.date_time),
                air_pressure: normalize(el.air_pressure.as_ref(), FieldPolicy::POSITIVE),
                weather: text(el.weather).filter(|w| w != "-99"),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;

    const RAINFALL_BODY: &str = r#"{
        "success": "true",
        "records": {
            "Station": [
                {
                    "StationName": "臺北", "StationId": "466920",
                    "ObsTime": {"DateTime": "2024-06-01T14:00:00+08:00"},
                    "GeoInfo": {"TownName": "中正區"},
                    "RainfallElement": {
                        "Past1hr": {"Precipitation": 10.0},
                        "Past24hr": {"Precipitation": "85.5"}
                    }
                },
                {
                    "StationName": "社子", "StationId": "C0A980",
                    "RainfallElement": {
                        "Past1hr": {"Precipitation": "20"},
                        "Past24hr": {"Precipitation": 90}
                    }
                },
                {
                    "StationName": "內湖", "StationId": "C0A9F0",
                    "RainfallElement": {
                        "Past1hr": {"Precipitation": -998},
                        "Past24hr": {}
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn test_decode_rainfall_group() {
        let stations = decode_rainfall(RAINFALL_BODY).unwrap();
        assert_eq!(stations.len(), 3);

        assert_eq!(stations[0].rain_1hr, Measurement::Valid(10.0));
        assert_eq!(stations[0].rain_24hr, Measurement::Valid(85.5));
        assert_eq!(stations[0].town_name.as_deref(), Some("中正區"));
        assert!(stations[0].observed_at.is_some());

        assert_eq!(stations[1].rain_1hr, Measurement::Valid(20.0));
        assert!(stations[1].observed_at.is_none());

        assert_eq!(
            stations[2].rain_1hr,
            Measurement::Invalid(ValidationError::Sentinel(-998.0))
        );
        assert_eq!(stations[2].rain_24hr, Measurement::Invalid(ValidationError::Missing));
    }

    #[test]
    fn test_rainfall_station_yields_both_categories() {
        let stations = decode_rainfall(RAINFALL_BODY).unwrap();
        let [one, day] = stations[0].readings();
        assert_eq!(one.category, Category::Rain1Hr);
        assert_eq!(day.category, Category::Rain24Hr);
        assert_eq!(one.station_id, "466920");
    }

    #[test]
    fn test_rejected_envelope() {
        let err = decode_rainfall(r#"{"success": "false"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Rejected(s) if s == "false"));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            decode_rainfall("<html>busy</html>"),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_decode_observation_with_gust() {
        let body = r#"{
            "success": "true",
            "records": {"Station": [{
                "StationName": "臺北", "StationId": "466920",
                "ObsTime": {"DateTime": "2024-06-01T14:00:00+08:00"},
                "WeatherElement": {
                    "Weather": "陰",
                    "AirTemperature": 28.4,
                    "RelativeHumidity": 75,
                    "WindSpeed": 3.2,
                    "AirPressure": 1008.1,
                    "GustInfo": {
                        "PeakGustSpeed": 12.6,
                        "Occurred_at": {"DateTime": "2024-06-01T13:40:00+08:00"}
                    }
                }
            }]}
        }"#;

        let obs = decode_observations(body).unwrap();
        assert_eq!(obs.len(), 1);
        let obs = &obs[0];
        assert_eq!(obs.gust_speed, Measurement::Valid(12.6));
        assert_eq!(obs.temperature, Measurement::Valid(28.4));
        assert_eq!(obs.wind_direction, Measurement::Invalid(ValidationError::Missing));
        assert_eq!(obs.weather.as_deref(), Some("陰"));
        assert!(obs.gust_occurred_at.is_some());
        assert_eq!(obs.gust_reading().category, Category::WindGust);
    }

    #[test]
    fn test_null_and_mistyped_fields_only_invalidate_their_reading() {
        let body = r#"{
            "success": "true",
            "records": {"Station": [
                {
                    "StationName": "臺北", "StationId": "466920",
                    "RainfallElement": {"Past1hr": {"Precipitation": 10.0}}
                },
                {
                    "StationName": "社子", "StationId": "C0A980",
                    "ObsTime": null,
                    "GeoInfo": null,
                    "RainfallElement": {
                        "Past1hr": null,
                        "Past24hr": {"Precipitation": false}
                    }
                }
            ]}
        }"#;

        let stations = decode_rainfall(body).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].rain_1hr, Measurement::Valid(10.0));

        let shezi = &stations[1];
        assert_eq!(shezi.town_name, None);
        assert_eq!(shezi.observed_at, None);
        assert_eq!(shezi.rain_1hr, Measurement::Invalid(ValidationError::Missing));
        assert_eq!(
            shezi.rain_24hr,
            Measurement::Invalid(ValidationError::Unparseable("false".to_string()))
        );
    }

    #[test]
    fn test_unusable_station_entry_is_skipped() {
        let body = r#"{
            "success": "true",
            "records": {"Station": [
                42,
                {"StationName": "內湖"},
                {
                    "StationName": "臺北", "StationId": "466920",
                    "RainfallElement": {"Past1hr": {"Precipitation": "3.5"}}
                }
            ]}
        }"#;

        let stations = decode_rainfall(body).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].station_id, "466920");
        assert_eq!(stations[0].rain_1hr, Measurement::Valid(3.5));
    }

    #[test]
    fn test_automatic_station_missing_observation_markers() {
        // O-A0001-001 body: automatic stations report -99 for missing values
        let body = r#"{
            "success": "true",
            "result": {"resource_id": "O-A0001-001"},
            "records": {"Station": [{
                "StationName": "社子", "StationId": "C0A980",
                "ObsTime": {"DateTime": "2024-06-01T14:00:00+08:00"},
                "GeoInfo": {"TownName": "士林區"},
                "WeatherElement": {
                    "Weather": "-99",
                    "AirTemperature": -99,
                    "WindSpeed": "2.1",
                    "WindDirection": -99,
                    "GustInfo": {"PeakGustSpeed": -99, "Occurred_at": null}
                }
            }]}
        }"#;

        let obs = decode_observations(body).unwrap();
        let obs = &obs[0];
        assert_eq!(obs.station_id, "C0A980");
        assert_eq!(obs.gust_speed, Measurement::Invalid(ValidationError::Sentinel(-99.0)));
        assert_eq!(obs.wind_direction.value(), None);
        assert_eq!(obs.temperature, Measurement::Invalid(ValidationError::Sentinel(-99.0)));
        assert_eq!(obs.wind_speed, Measurement::Valid(2.1));
        assert_eq!(obs.gust_occurred_at, None);
        assert_eq!(obs.weather, None);
        assert!(!obs.gust_reading().value.is_valid());
    }

    #[test]
    fn test_observation_envelope_without_records() {
        let obs = decode_observations(r#"{"success": "true"}"#).unwrap();
        assert!(obs.is_empty());
    }
}
