//! Pump-station warning status
//!
//! Classified from the inner water level on every reading, with no memory of
//! earlier readings and no hysteresis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inner level at which pumping starts (m)
pub const START_PUMPING_LEVEL_M: f64 = 2.0;

/// Inner level at which the station is in danger (m)
pub const ALERT_LEVEL_M: f64 = 2.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PumpStatus {
    Normal,
    Warning,
    Danger,
}

impl PumpStatus {
    pub fn from_inner_level(level: f64) -> Self {
        if level >= ALERT_LEVEL_M {
            Self::Danger
        } else if level >= START_PUMPING_LEVEL_M {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}

impl fmt::Display for PumpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Warning => write!(f, "WARNING"),
            Self::Danger => write!(f, "DANGER"),
        }
    }
}

/// Whether any pump is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PumpActivity {
    Running,
    Standby,
}

impl PumpActivity {
    pub fn from_count(pump_count: u32) -> Self {
        if pump_count > 0 {
            Self::Running
        } else {
            Self::Standby
        }
    }
}

impl fmt::Display for PumpActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Standby => write!(f, "STANDBY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_level_buckets() {
        assert_eq!(PumpStatus::from_inner_level(1.99), PumpStatus::Normal);
        assert_eq!(PumpStatus::from_inner_level(2.0), PumpStatus::Warning);
        assert_eq!(PumpStatus::from_inner_level(2.05), PumpStatus::Warning);
        assert_eq!(PumpStatus::from_inner_level(2.59), PumpStatus::Warning);
        assert_eq!(PumpStatus::from_inner_level(2.6), PumpStatus::Danger);
    }

    #[test]
    fn test_status_flaps_without_hysteresis() {
        let levels = [2.61, 2.59, 2.61];
        let statuses: Vec<_> = levels.iter().map(|l| PumpStatus::from_inner_level(*l)).collect();
        assert_eq!(
            statuses,
            vec![PumpStatus::Danger, PumpStatus::Warning, PumpStatus::Danger]
        );
    }

    #[test]
    fn test_pump_activity() {
        assert_eq!(PumpActivity::from_count(0), PumpActivity::Standby);
        assert_eq!(PumpActivity::from_count(3), PumpActivity::Running);
        assert_eq!(PumpActivity::Running.to_string(), "RUNNING");
    }
}
