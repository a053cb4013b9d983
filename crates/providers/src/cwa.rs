//! CWA open-data API client
//!
//! API documentation: https://opendata.cwa.gov.tw/dist/opendata-swagger.html

use crate::{ProviderError, ProvidersConfig, StationRef, WeatherProvider};
use async_trait::async_trait;
use normalizer::{decode_observations, decode_rainfall, RainfallStation, WeatherObservation};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

const RAINFALL_DATASET: &str = "O-A0002-001";

/// Station networks publishing observations, in fallback order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationNetwork {
    /// Manned synoptic stations (`O-A0003-001`), most complete data
    Manned,
    /// Automatic weather stations (`O-A0001-001`)
    Automatic,
}

impl StationNetwork {
    pub fn dataset(&self) -> &'static str {
        match self {
            Self::Manned => "O-A0003-001",
            Self::Automatic => "O-A0001-001",
        }
    }
}

impl fmt::Display for StationNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.dataset())
    }
}

/// Query networks in order and return the first that reports the station
///
/// `Ok(None)` from `fetch` means the network answered without the station.
/// Errors move on to the next network; if none succeeds the last error is
/// returned, or `StationNotFound` when every network answered empty.
pub async fn first_available<T, F, Fut>(
    networks: &[StationNetwork],
    station: &str,
    mut fetch: F,
) -> Result<T, ProviderError>
where
    F: FnMut(StationNetwork) -> Fut,
    Fut: Future<Output = Result<Option<T>, ProviderError>>,
{
    let mut last_error = None;
    for &network in networks {
        match fetch(network).await {
            Ok(Some(found)) => {
                debug!("{} found on {}", station, network);
                return Ok(found);
            }
            Ok(None) => debug!("{} not reported by {}", station, network),
            Err(e) => {
                warn!("{} lookup on {} failed: {}", station, network, e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| ProviderError::StationNotFound(station.to_string())))
}

/// HTTP client for the CWA datastore
pub struct CwaClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    networks: Vec<StationNetwork>,
}

impl CwaClient {
    pub fn new(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        if config.cwa_api_key.is_empty() {
            warn!("CWA API key is empty, requests will be rejected");
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        info!("CWA client for {}", config.cwa_base_url);
        Ok(Self {
            http,
            base_url: config.cwa_base_url.trim_end_matches('/').to_string(),
            api_key: config.cwa_api_key.clone(),
            networks: vec![StationNetwork::Manned, StationNetwork::Automatic],
        })
    }

    async fn get_dataset(
        &self,
        dataset: &str,
        query: &[(&str, String)],
    ) -> Result<String, ProviderError> {
        let url = format!("{}/v1/rest/datastore/{}", self.base_url, dataset);
        let response = self
            .http
            .get(&url)
            .query(&[("Authorization", self.api_key.as_str()), ("format", "JSON")])
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn fetch_from_network(
        &self,
        network: StationNetwork,
        station_name: &str,
    ) -> Result<Option<WeatherObservation>, ProviderError> {
        let body = self
            .get_dataset(network.dataset(), &[("StationName", station_name.to_string())])
            .await?;
        Ok(decode_observations(&body)?.into_iter().next())
    }
}

/// Keep one entry per requested station
fn restrict_to_group(stations: Vec<RainfallStation>, group: &[StationRef]) -> Vec<RainfallStation> {
    let mut seen = HashSet::new();
    stations
        .into_iter()
        .filter(|s| group.iter().any(|g| g.id == s.station_id || g.name == s.station_name))
        .filter(|s| seen.insert(s.station_id.clone()))
        .collect()
}

#[async_trait]
impl WeatherProvider for CwaClient {
    async fn fetch_rainfall(
        &self,
        stations: &[StationRef],
    ) -> Result<Vec<RainfallStation>, ProviderError> {
        let names = stations
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let body = self
            .get_dataset(
                RAINFALL_DATASET,
                &[
                    ("StationName", names),
                    ("WeatherElement", "Now,Past1hr,Past24hr".to_string()),
                ],
            )
            .await?;

        let decoded = restrict_to_group(decode_rainfall(&body)?, stations);
        debug!("Rainfall reported by {}/{} stations", decoded.len(), stations.len());
        Ok(decoded)
    }

    async fn fetch_observation(
        &self,
        station_name: &str,
    ) -> Result<WeatherObservation, ProviderError> {
        first_available(&self.networks, station_name, |network| {
            self.fetch_from_network(network, station_name)
        })
        .await
    }
}
