//! Flood Sentinel Service
//!
//! Loads settings, initialises logging, wires the providers, repository
//! and threshold store into the monitor, and runs until interrupted.

mod settings;

pub use settings::{LoggingSettings, Settings, DEFAULT_SETTINGS_PATH};

use anyhow::Context;
use monitor::{CycleOutcome, Monitor};
use providers::{CwaClient, HeoPumpClient};
use std::path::Path;
use std::sync::Arc;
use storage::Repository;
use thresholds::{FileThresholdStore, StaticThresholdStore, ThresholdStore};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let level: Level = settings.level.parse().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if settings.format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("Failed to set tracing subscriber")
}

/// Threshold store chosen by the settings
pub fn threshold_store(settings: &Settings, path: &Path) -> Arc<dyn ThresholdStore> {
    if settings.live_thresholds {
        info!("Threshold overrides re-read from {} every cycle", path.display());
        Arc::new(FileThresholdStore::new(path))
    } else {
        Arc::new(StaticThresholdStore::from(settings.thresholds.clone()))
    }
}

/// Log each published outcome until the monitor stops
pub async fn report_outcomes(mut outcomes: mpsc::Receiver<CycleOutcome>) -> usize {
    let mut reported = 0;
    while let Some(outcome) = outcomes.recv().await {
        reported += 1;
        match outcome.overall() {
            Some(severity) => warn!(cycle = %outcome.cycle_id, "Flood status {}", severity),
            None => info!(cycle = %outcome.cycle_id, "Flood status NORMAL"),
        }
        for alert in &outcome.alerts {
            warn!(
                "{} {}: {} (threshold {})",
                alert.category.label(),
                alert.severity,
                alert.value,
                alert.threshold
            );
        }
        match serde_json::to_string(&outcome) {
            Ok(json) => debug!("Outcome: {}", json),
            Err(e) => warn!("Failed to serialize outcome: {}", e),
        }
    }
    reported
}

/// Run the service until Ctrl-C
pub async fn run(settings: Settings, settings_path: &Path) -> anyhow::Result<()> {
    let weather = Arc::new(CwaClient::new(&settings.providers).context("CWA client")?);
    let water = Arc::new(HeoPumpClient::new(&settings.providers).context("Pump feed client")?);
    let repository = Arc::new(Repository::new());
    let thresholds = threshold_store(&settings, settings_path);

    let monitor = Arc::new(Monitor::new(
        settings.monitor.clone(),
        weather,
        water,
        repository,
        thresholds,
    ));

    let (outcome_tx, outcome_rx) = mpsc::channel(settings.monitor.channel_capacity.max(1));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let runner = Arc::clone(&monitor);
    let monitor_task = tokio::spawn(async move { runner.run(outcome_tx, shutdown_rx).await });
    let reporter_task = tokio::spawn(report_outcomes(outcome_rx));

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("Shutdown signal received");

    // The monitor may already have stopped on its own
    let _ = shutdown_tx.send(true);
    monitor_task.await.context("Monitor task failed")?;
    let reported = reporter_task.await.context("Reporter task failed")?;

    info!("Stopped after {} cycles", reported);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use thresholds::{Category, ThresholdOverride, ThresholdRegistry};

    #[tokio::test]
    async fn test_static_threshold_store_from_settings() {
        let mut settings = Settings {
            live_thresholds: false,
            ..Settings::default()
        };
        settings.thresholds.wind_gust = Some(ThresholdOverride {
            warning: 8.0,
            danger: 12.0,
            critical: None,
            unit: None,
            enabled: true,
        });

        let store = threshold_store(&settings, &PathBuf::from(DEFAULT_SETTINGS_PATH));
        let registry = ThresholdRegistry::resolve(store.as_ref()).await;
        assert_eq!(registry.get(Category::WindGust).warning, 8.0);
        assert_eq!(registry.get(Category::WindGust).unit, "m/s");
        assert_eq!(registry.get(Category::Rain1Hr).warning, 15.0);
    }

    #[tokio::test]
    async fn test_reporter_drains_until_closed() {
        let (tx, rx) = mpsc::channel(2);
        drop(tx);
        assert_eq!(report_outcomes(rx).await, 0);
    }
}
