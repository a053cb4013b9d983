//! Service settings loading

use config::{Config, ConfigError, Environment, File};
use monitor::MonitorConfig;
use providers::ProvidersConfig;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thresholds::ThresholdOverrides;

/// Default settings file, relative to the working directory
pub const DEFAULT_SETTINGS_PATH: &str = "config/sentinel.toml";

/// Service settings
///
/// Every section has defaults, so the service starts without a file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub thresholds: ThresholdOverrides,
    /// Re-read `[thresholds]` from the settings file every cycle
    #[serde(default = "default_true")]
    pub live_thresholds: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingSettings::default(),
            monitor: MonitorConfig::default(),
            providers: ProvidersConfig::default(),
            thresholds: ThresholdOverrides::default(),
            live_thresholds: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Settings file path from `SENTINEL_CONFIG`, or the default
    pub fn path() -> PathBuf {
        env::var("SENTINEL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH))
    }

    /// Load from a TOML file (optional) and `SENTINEL_*` environment
    /// variables, e.g. `SENTINEL_PROVIDERS__CWA_API_KEY`
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("SENTINEL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
