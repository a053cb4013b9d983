//! Threshold Registry Implementation

use crate::{Category, ThresholdError, ThresholdStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Tiered boundaries for one category
///
/// Tiers are inclusive lower bounds: a value equal to `danger` is a danger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub category: Category,
    pub warning: f64,
    pub danger: f64,
    /// Some categories stop at the danger tier
    pub critical: Option<f64>,
    pub unit: String,
    /// Disabled categories never raise alerts
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ThresholdSet {
    /// Create an enabled threshold set
    pub fn new(
        category: Category,
        warning: f64,
        danger: f64,
        critical: Option<f64>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            category,
            warning,
            danger,
            critical,
            unit: unit.into(),
            enabled: true,
        }
    }

    /// Compiled-in default for a category
    pub fn default_for(category: Category) -> Self {
        match category {
            Category::Rain1Hr => Self::new(category, 15.0, 40.0, Some(80.0), "mm"),
            Category::Rain24Hr => Self::new(category, 80.0, 200.0, Some(350.0), "mm"),
            Category::WindGust => Self::new(category, 10.0, 15.0, Some(20.0), "m/s"),
            Category::WaterLevel => Self::new(category, 2.0, 2.4, Some(2.6), "m"),
        }
    }

    /// Check that the tiers are finite and strictly ascending
    pub fn validate(&self) -> Result<(), ThresholdError> {
        let finite = self.warning.is_finite()
            && self.danger.is_finite()
            && self.critical.map_or(true, f64::is_finite);
        if !finite {
            return Err(ThresholdError::NotFinite {
                category: self.category,
            });
        }

        let ascending =
            self.warning < self.danger && self.critical.map_or(true, |c| self.danger < c);
        if !ascending {
            return Err(ThresholdError::OutOfOrder {
                category: self.category,
                warning: self.warning,
                danger: self.danger,
                critical: self.critical,
            });
        }

        Ok(())
    }
}

/// Read-only snapshot of the thresholds for every category
///
/// A cycle resolves one registry at its start and evaluates against it
/// until the cycle completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRegistry {
    sets: BTreeMap<Category, ThresholdSet>,
    overridden: bool,
}

impl ThresholdRegistry {
    /// Registry holding only the compiled-in defaults
    pub fn defaults() -> Self {
        let sets = Category::ALL
            .into_iter()
            .map(|c| (c, ThresholdSet::default_for(c)))
            .collect();
        Self {
            sets,
            overridden: false,
        }
    }

    /// Apply overrides on top of the defaults
    ///
    /// Invalid overrides are skipped and the default for that category is
    /// kept.
    pub fn with_overrides(overrides: impl IntoIterator<Item = ThresholdSet>) -> Self {
        let mut registry = Self::defaults();
        for set in overrides {
            match set.validate() {
                Ok(()) => {
                    debug!("Threshold override for {}: {:?}", set.category, set);
                    registry.overridden = true;
                    registry.sets.insert(set.category, set);
                }
                Err(e) => warn!("Ignoring threshold override: {}", e),
            }
        }
        registry
    }

    /// Load the current registry from a store, falling back to defaults
    pub async fn resolve(store: &dyn ThresholdStore) -> Self {
        match store.load_overrides().await {
            Ok(overrides) if overrides.is_empty() => {
                debug!("No threshold overrides, using defaults");
                Self::defaults()
            }
            Ok(overrides) => {
                info!("Loaded {} threshold overrides", overrides.len());
                Self::with_overrides(overrides)
            }
            Err(e) => {
                warn!("Threshold store failed, using defaults: {}", e);
                Self::defaults()
            }
        }
    }

    /// Threshold set for a category
    pub fn get(&self, category: Category) -> &ThresholdSet {
        // Every category is seeded in defaults() and entries are only replaced
        &self.sets[&category]
    }

    /// Whether any override is in effect
    pub fn is_default(&self) -> bool {
        !self.overridden
    }
}

impl Default for ThresholdRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}
