//! Monitored categories

use crate::ThresholdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One monitored physical quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Rainfall accumulated over the past hour (mm)
    #[serde(rename = "RAIN_1HR")]
    Rain1Hr,
    /// Rainfall accumulated over the past 24 hours (mm)
    #[serde(rename = "RAIN_24HR")]
    Rain24Hr,
    /// Peak wind gust (m/s)
    #[serde(rename = "WIND_GUST")]
    WindGust,
    /// Pump-station inner water level (m)
    #[serde(rename = "WATER_LEVEL")]
    WaterLevel,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 4] = [
        Category::Rain1Hr,
        Category::Rain24Hr,
        Category::WindGust,
        Category::WaterLevel,
    ];

    /// Wire name used by the alert log and the dashboard
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rain1Hr => "RAIN_1HR",
            Self::Rain24Hr => "RAIN_24HR",
            Self::WindGust => "WIND_GUST",
            Self::WaterLevel => "WATER_LEVEL",
        }
    }

    /// Operator-facing label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rain1Hr => "Hourly rainfall",
            Self::Rain24Hr => "24-hour accumulated rainfall",
            Self::WindGust => "Strong wind gust",
            Self::WaterLevel => "Water level",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ThresholdError::UnknownCategory(s.to_string()))
    }
}
