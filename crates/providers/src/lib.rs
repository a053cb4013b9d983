//! Provider Clients
//!
//! Fetches raw station payloads from the CWA open-data API and the Taipei
//! pump-station feed and hands them to the normalizer's decoders.

mod config;
mod cwa;
mod error;
mod pump;

pub use config::{PumpStationRef, ProvidersConfig, StationRef};
pub use cwa::{first_available, CwaClient, StationNetwork};
pub use error::ProviderError;
pub use pump::{select_pump_station, HeoPumpClient};

use async_trait::async_trait;
use normalizer::{PumpStationReading, RainfallStation, WeatherObservation};

/// Weather observations for named stations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Rainfall for every station of a nearby-station group
    async fn fetch_rainfall(
        &self,
        stations: &[StationRef],
    ) -> Result<Vec<RainfallStation>, ProviderError>;

    /// Latest observation (including gust) for one station
    async fn fetch_observation(&self, station_name: &str)
        -> Result<WeatherObservation, ProviderError>;
}

/// Current pump-station state
#[async_trait]
pub trait WaterLevelProvider: Send + Sync {
    async fn fetch_pump_station(
        &self,
        station: &PumpStationRef,
    ) -> Result<PumpStationReading, ProviderError>;
}
