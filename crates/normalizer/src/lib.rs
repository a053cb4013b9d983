//! Reading Normalization
//!
//! Turns raw provider fields (numeric text, JSON numbers, absent values and
//! "no data" sentinels such as -998) into typed measurements, and decodes the
//! provider payloads that carry them.

mod cwa;
mod error;
mod normalizer;
mod pump;
mod reading;

pub use cwa::{decode_observations, decode_rainfall, RainfallStation, WeatherObservation};
pub use error::{DecodeError, ValidationError};
pub use normalizer::{normalize, normalize_str, FieldPolicy, Measurement, Missing, RawField, Sign};
pub use pump::{decode_pump_stations, PumpStationReading};
pub use reading::{parse_timestamp, StationReading};
