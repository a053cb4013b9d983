//! Alerting System
//!
//! Aggregates station readings, classifies values against tiered
//! thresholds, and merges the per-category alerts into one ranked set.

mod aggregate;
mod classify;
mod merge;
mod pump;
mod types;

pub use aggregate::{aggregate, round_one_decimal, single_station_value};
pub use classify::{classify, classify_metric};
pub use merge::{highest_visible, visible_alerts, AlertSet};
pub use pump::{PumpActivity, PumpStatus, ALERT_LEVEL_M, START_PUMPING_LEVEL_M};
pub use types::{AggregatedMetric, Alert, AlertKey, Severity};
