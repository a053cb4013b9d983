//! Tiered threshold classification

use crate::{Alert, Severity};
use thresholds::ThresholdSet;
use tracing::debug;

/// Highest tier a value reaches, if any
///
/// Tiers are checked from critical downward and the first match wins, so a
/// value is reported once, at its highest qualifying tier. Boundaries are
/// inclusive.
pub fn classify(value: f64, set: &ThresholdSet) -> Option<Alert> {
    if !set.enabled {
        debug!("{} alerts disabled", set.category);
        return None;
    }

    let (severity, threshold) = match set.critical {
        Some(critical) if value >= critical => (Severity::Critical, critical),
        _ if value >= set.danger => (Severity::Danger, set.danger),
        _ if value >= set.warning => (Severity::Warning, set.warning),
        _ => return None,
    };

    debug!("{} {} at {} (threshold {})", set.category, severity, value, threshold);
    Some(Alert {
        category: set.category,
        severity,
        value,
        threshold,
    })
}

/// Classify a value that may be "no data"; no data never raises an alert
pub fn classify_metric(value: Option<f64>, set: &ThresholdSet) -> Option<Alert> {
    value.and_then(|v| classify(v, set))
}
