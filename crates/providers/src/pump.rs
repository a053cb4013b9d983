//! Taipei Hydraulic Engineering Office pump-station feed client

use crate::{ProviderError, ProvidersConfig, PumpStationRef, WaterLevelProvider};
use async_trait::async_trait;
use normalizer::{decode_pump_stations, PumpStationReading};
use std::time::Duration;
use tracing::debug;

/// Pick the monitored station out of the feed: exact id first, then the
/// first station whose name contains the configured name
pub fn select_pump_station(
    stations: Vec<PumpStationReading>,
    target: &PumpStationRef,
) -> Option<PumpStationReading> {
    let by_name = |s: &PumpStationReading| {
        !target.name.is_empty() && s.station_name.contains(&target.name)
    };

    match stations.iter().position(|s| s.station_id == target.id) {
        Some(i) => stations.into_iter().nth(i),
        None => stations.into_iter().find(by_name),
    }
}

pub struct HeoPumpClient {
    http: reqwest::Client,
    feed_url: String,
}

impl HeoPumpClient {
    pub fn new(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            feed_url: config.pump_feed_url.clone(),
        })
    }
}

#[async_trait]
impl WaterLevelProvider for HeoPumpClient {
    async fn fetch_pump_station(
        &self,
        station: &PumpStationRef,
    ) -> Result<PumpStationReading, ProviderError> {
        let response = self
            .http
            .get(&self.feed_url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let stations = decode_pump_stations(&body)?;
        debug!("Pump feed lists {} stations", stations.len());

        select_pump_station(stations, station).ok_or_else(|| {
            ProviderError::StationNotFound(format!("{} ({})", station.name, station.id))
        })
    }
}
