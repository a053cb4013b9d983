//! Provider configuration

use serde::{Deserialize, Serialize};

/// A weather station of the nearby-station group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub town: Option<String>,
}

impl StationRef {
    pub fn new(id: &str, name: &str, town: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            town: Some(town.to_string()),
        }
    }
}

/// The monitored pump station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpStationRef {
    pub id: String,
    /// Matched as a substring when the id is not in the feed
    pub name: String,
}

/// Provider endpoints and client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// CWA open-data API root
    #[serde(default = "default_cwa_base_url")]
    pub cwa_base_url: String,
    /// CWA authorization key
    #[serde(default)]
    pub cwa_api_key: String,
    /// Pump-station "latest" feed
    #[serde(default = "default_pump_feed_url")]
    pub pump_feed_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_cwa_base_url() -> String {
    "https://opendata.cwa.gov.tw/api".to_string()
}

fn default_pump_feed_url() -> String {
    "https://heopublic.gov.taipei/taipei-heo-api/openapi/pumb/latest".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            cwa_base_url: default_cwa_base_url(),
            cwa_api_key: String::new(),
            pump_feed_url: default_pump_feed_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
