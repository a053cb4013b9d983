//! Threshold stores
//!
//! A store only reports overrides; the registry owns the fallback to the
//! compiled-in defaults.

use crate::{Category, ThresholdError, ThresholdSet};
use async_trait::async_trait;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Read interface for administrative threshold overrides
#[async_trait]
pub trait ThresholdStore: Send + Sync {
    /// Current overrides. An empty list means "use the defaults".
    async fn load_overrides(&self) -> Result<Vec<ThresholdSet>, ThresholdError>;
}

/// Override for one category as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverride {
    pub warning: f64,
    pub danger: f64,
    #[serde(default)]
    pub critical: Option<f64>,
    /// Defaults to the compiled-in unit for the category
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ThresholdOverride {
    fn into_set(self, category: Category) -> ThresholdSet {
        let unit = self
            .unit
            .unwrap_or_else(|| ThresholdSet::default_for(category).unit);
        ThresholdSet {
            category,
            warning: self.warning,
            danger: self.danger,
            critical: self.critical,
            unit,
            enabled: self.enabled,
        }
    }
}

/// The `[thresholds]` configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverrides {
    #[serde(default)]
    pub rain_1hr: Option<ThresholdOverride>,
    #[serde(default)]
    pub rain_24hr: Option<ThresholdOverride>,
    #[serde(default)]
    pub wind_gust: Option<ThresholdOverride>,
    #[serde(default)]
    pub water_level: Option<ThresholdOverride>,
}

impl ThresholdOverrides {
    /// Flatten the section into threshold sets
    pub fn into_sets(self) -> Vec<ThresholdSet> {
        [
            (Category::Rain1Hr, self.rain_1hr),
            (Category::Rain24Hr, self.rain_24hr),
            (Category::WindGust, self.wind_gust),
            (Category::WaterLevel, self.water_level),
        ]
        .into_iter()
        .filter_map(|(category, o)| o.map(|o| o.into_set(category)))
        .collect()
    }
}

/// Fixed overrides, typically taken from the service settings
#[derive(Debug, Clone, Default)]
pub struct StaticThresholdStore {
    sets: Vec<ThresholdSet>,
}

impl StaticThresholdStore {
    pub fn new(sets: Vec<ThresholdSet>) -> Self {
        Self { sets }
    }
}

impl From<ThresholdOverrides> for StaticThresholdStore {
    fn from(overrides: ThresholdOverrides) -> Self {
        Self::new(overrides.into_sets())
    }
}

#[async_trait]
impl ThresholdStore for StaticThresholdStore {
    async fn load_overrides(&self) -> Result<Vec<ThresholdSet>, ThresholdError> {
        Ok(self.sets.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ThresholdFile {
    #[serde(default)]
    thresholds: ThresholdOverrides,
}

/// TOML file re-read on every load, with `SENTINEL_THRESHOLDS__*`
/// environment overrides
///
/// Re-reading lets operators edit the file while the service runs; the
/// next cycle picks the change up.
#[derive(Debug, Clone)]
pub struct FileThresholdStore {
    path: PathBuf,
    read_env: bool,
}

impl FileThresholdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_env: true,
        }
    }

    /// Ignore environment variables (file only)
    pub fn file_only(mut self) -> Self {
        self.read_env = false;
        self
    }

    fn load(&self) -> Result<ThresholdFile, ThresholdError> {
        let mut builder =
            Config::builder().add_source(File::from(self.path.as_path()).required(false));
        if self.read_env {
            builder = builder.add_source(
                Environment::with_prefix("SENTINEL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }
        Ok(builder.build()?.try_deserialize()?)
    }
}

#[async_trait]
impl ThresholdStore for FileThresholdStore {
    async fn load_overrides(&self) -> Result<Vec<ThresholdSet>, ThresholdError> {
        let store = self.clone();
        let file = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| ThresholdError::StoreUnavailable(format!("Threshold read task: {}", e)))??;
        let sets = file.thresholds.into_sets();
        debug!("Read {} threshold overrides from {}", sets.len(), self.path.display());
        Ok(sets)
    }
}
