//! Alert merging and severity ranking

use crate::{Alert, AlertKey, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Alerts of one evaluation cycle, in insertion order, at most one per
/// category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSet {
    alerts: Vec<Alert>,
}

impl AlertSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alert
    ///
    /// If the category is already present the higher severity is kept, in
    /// the slot of the first alert.
    pub fn merge(&mut self, alert: Alert) {
        match self.alerts.iter_mut().find(|a| a.category == alert.category) {
            Some(existing) if alert.severity > existing.severity => {
                debug!(
                    "{} raised from {} to {}",
                    alert.category, existing.severity, alert.severity
                );
                *existing = alert;
            }
            Some(existing) => {
                debug!(
                    "{} already at {}, ignoring {}",
                    alert.category, existing.severity, alert.severity
                );
            }
            None => self.alerts.push(alert),
        }
    }

    /// Highest severity in the set; `None` means normal
    pub fn overall(&self) -> Option<Severity> {
        self.alerts.iter().map(|a| a.severity).max()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alert> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl Extend<Alert> for AlertSet {
    fn extend<I: IntoIterator<Item = Alert>>(&mut self, iter: I) {
        for alert in iter {
            self.merge(alert);
        }
    }
}

impl FromIterator<Alert> for AlertSet {
    fn from_iter<I: IntoIterator<Item = Alert>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a AlertSet {
    type Item = &'a Alert;
    type IntoIter = std::slice::Iter<'a, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Alerts left after removing dismissed `(category, severity)` pairs
///
/// The evaluated set is not modified; a later cycle that raises the same
/// pair again is filtered by the same key.
pub fn visible_alerts(set: &AlertSet, dismissed: &HashSet<AlertKey>) -> Vec<Alert> {
    set.iter()
        .filter(|a| !dismissed.contains(&a.key()))
        .cloned()
        .collect()
}

/// Highest severity among the visible alerts
pub fn highest_visible(set: &AlertSet, dismissed: &HashSet<AlertKey>) -> Option<Severity> {
    set.iter()
        .filter(|a| !dismissed.contains(&a.key()))
        .map(|a| a.severity)
        .max()
}
