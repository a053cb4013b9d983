//! Monitor configuration

use providers::{PumpStationRef, StationRef};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the monitoring cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between cycle starts (default: 300)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Buffered outcomes before new ones are dropped
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Rainfall stations averaged together
    #[serde(default = "default_nearby_stations")]
    pub nearby_stations: Vec<StationRef>,
    /// Station name queried for the gust observation
    #[serde(default = "default_gust_station")]
    pub gust_station: String,
    #[serde(default = "default_pump_station")]
    pub pump_station: PumpStationRef,
}

fn default_interval_secs() -> u64 {
    300
}

fn default_channel_capacity() -> usize {
    16
}

fn default_nearby_stations() -> Vec<StationRef> {
    vec![
        StationRef::new("466920", "臺北", "中正區"),
        StationRef::new("C0A980", "社子", "士林區"),
        StationRef::new("C0A9F0", "內湖", "內湖區"),
    ]
}

fn default_gust_station() -> String {
    "臺北".to_string()
}

fn default_pump_station() -> PumpStationRef {
    PumpStationRef {
        id: "108".to_string(),
        name: "中山".to_string(),
    }
}

impl MonitorConfig {
    /// Cycle period, at least one second
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            channel_capacity: default_channel_capacity(),
            nearby_stations: default_nearby_stations(),
            gust_station: default_gust_station(),
            pump_station: default_pump_station(),
        }
    }
}
