//! Alert domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thresholds::Category;

/// Alert severity tiers, ascending
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warning,
    Danger,
    Critical,
}

impl Severity {
    /// Numeric rank used for the overall status (WARNING 1 .. CRITICAL 3)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Warning => 1,
            Self::Danger => 2,
            Self::Critical => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Danger => "DANGER",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an alert for dismissal: the same category and tier on a
/// later cycle is the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub category: Category,
    pub severity: Severity,
}

/// A raised condition for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub category: Category,
    pub severity: Severity,
    /// Triggering measurement
    pub value: f64,
    /// Boundary that was reached
    pub threshold: f64,
}

impl Alert {
    pub fn key(&self) -> AlertKey {
        AlertKey {
            category: self.category,
            severity: self.severity,
        }
    }

    /// Operator-facing description, e.g.
    /// `Hourly rainfall DANGER: 50.0 mm (threshold 40 mm)`
    pub fn message(&self, unit: &str) -> String {
        format!(
            "{} {}: {:.1} {} (threshold {} {})",
            self.category.label(),
            self.severity,
            self.value,
            unit,
            self.threshold,
            unit
        )
    }
}

/// One category's value combined across a nearby-station group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetric {
    pub category: Category,
    /// Mean of the valid readings, rounded to one decimal
    pub average: f64,
    /// Number of valid readings in the mean (always > 0)
    pub source_count: usize,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order_and_rank() {
        assert!(Severity::Warning < Severity::Danger);
        assert!(Severity::Danger < Severity::Critical);
        assert_eq!(Severity::Warning.rank(), 1);
        assert_eq!(Severity::Critical.rank(), 3);
    }

    #[test]
    fn test_alert_message() {
        let alert = Alert {
            category: Category::Rain1Hr,
            severity: Severity::Danger,
            value: 50.0,
            threshold: 40.0,
        };
        assert_eq!(alert.message("mm"), "Hourly rainfall DANGER: 50.0 mm (threshold 40 mm)");
    }
}
