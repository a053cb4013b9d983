//! Monitoring cycle and run loop

use crate::persist::{alert_drafts, persist, water_level_record, weather_records, PersistBatch};
use crate::{CycleOutcome, GustSummary, MonitorConfig, PumpSummary};
use alerting::{
    aggregate, classify_metric, single_station_value, AlertSet, PumpActivity, PumpStatus,
};
use chrono::Utc;
use normalizer::StationReading;
use providers::{ProviderError, WaterLevelProvider, WeatherProvider};
use std::sync::Arc;
use storage::ObservationRecorder;
use thresholds::{Category, ThresholdRegistry, ThresholdStore};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// A failed fetch means "no readings" for that category
fn recover<T>(source: &'static str, result: Result<T, ProviderError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} fetch failed: {}", source, e);
            metrics::counter!("sentinel_fetch_failures_total", "source" => source).increment(1);
            None
        }
    }
}

/// Flood monitor
pub struct Monitor {
    config: MonitorConfig,
    weather: Arc<dyn WeatherProvider>,
    water: Arc<dyn WaterLevelProvider>,
    recorder: Arc<dyn ObservationRecorder>,
    thresholds: Arc<dyn ThresholdStore>,
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        weather: Arc<dyn WeatherProvider>,
        water: Arc<dyn WaterLevelProvider>,
        recorder: Arc<dyn ObservationRecorder>,
        thresholds: Arc<dyn ThresholdStore>,
    ) -> Self {
        info!(
            "Monitor created: {} nearby stations, gust from {}, pump station {}",
            config.nearby_stations.len(),
            config.gust_station,
            config.pump_station.id
        );
        Self {
            config,
            weather,
            water,
            recorder,
            thresholds,
        }
    }

    /// Run one cycle and start persisting its records in the background
    ///
    /// The returned outcome does not depend on persistence succeeding.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let (outcome, batch) = self.evaluate().await;

        let recorder = Arc::clone(&self.recorder);
        let evaluated_at = outcome.evaluated_at;
        let span = info_span!("persist", cycle = %outcome.cycle_id);
        tokio::spawn(persist(recorder, batch, evaluated_at).instrument(span));

        outcome
    }

    /// Fetch, aggregate, classify, and merge against one threshold snapshot
    pub(crate) async fn evaluate(&self) -> (CycleOutcome, PersistBatch) {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("cycle", id = %cycle_id);

        async move {
            let registry = ThresholdRegistry::resolve(self.thresholds.as_ref()).await;

            let (rainfall, observation, pump) = tokio::join!(
                self.weather.fetch_rainfall(&self.config.nearby_stations),
                self.weather.fetch_observation(&self.config.gust_station),
                self.water.fetch_pump_station(&self.config.pump_station),
            );
            let rainfall = recover("rainfall", rainfall).unwrap_or_default();
            let observation = recover("gust", observation);
            let pump = recover("water_level", pump);

            let evaluated_at = Utc::now();
            let rain_readings: Vec<StationReading> =
                rainfall.iter().flat_map(|s| s.readings()).collect();
            let rain_1hr = aggregate(Category::Rain1Hr, &rain_readings, evaluated_at);
            let rain_24hr = aggregate(Category::Rain24Hr, &rain_readings, evaluated_at);

            let gust = observation.as_ref().map(|obs| GustSummary {
                station_id: obs.station_id.clone(),
                station_name: obs.station_name.clone(),
                gust_speed: single_station_value(&[obs.gust_reading()], Category::WindGust),
                observed_at: obs.observed_at,
            });

            let pump_summary = pump.as_ref().map(|p| {
                let inner_level = single_station_value(&[p.level_reading()], Category::WaterLevel);
                PumpSummary {
                    station_id: p.station_id.clone(),
                    station_name: p.station_name.clone(),
                    inner_level,
                    outer_level: p.outer_level.value(),
                    pump_count: p.pump_count,
                    status: inner_level.map(PumpStatus::from_inner_level),
                    activity: PumpActivity::from_count(p.pump_count),
                    observed_at: p.observed_at,
                }
            });

            let alerts: AlertSet = [
                classify_metric(
                    rain_1hr.as_ref().map(|m| m.average),
                    registry.get(Category::Rain1Hr),
                ),
                classify_metric(
                    rain_24hr.as_ref().map(|m| m.average),
                    registry.get(Category::Rain24Hr),
                ),
                classify_metric(
                    gust.as_ref().and_then(|g| g.gust_speed),
                    registry.get(Category::WindGust),
                ),
                classify_metric(
                    pump_summary.as_ref().and_then(|p| p.inner_level),
                    registry.get(Category::WaterLevel),
                ),
            ]
            .into_iter()
            .flatten()
            .collect();

            for alert in &alerts {
                metrics::counter!("sentinel_alerts_total", "severity" => alert.severity.as_str())
                    .increment(1);
            }
            metrics::counter!("sentinel_cycles_total").increment(1);

            let outcome = CycleOutcome {
                cycle_id,
                evaluated_at,
                rain_1hr,
                rain_24hr,
                gust,
                pump: pump_summary,
                alerts,
                thresholds_overridden: !registry.is_default(),
            };

            match outcome.overall() {
                Some(severity) => info!(
                    "Cycle complete: {} ({} alerts)",
                    severity,
                    outcome.alerts.len()
                ),
                None => info!("Cycle complete: normal"),
            }

            let batch = PersistBatch {
                weather: weather_records(&rainfall, observation.as_ref(), evaluated_at),
                water_level: pump.as_ref().map(|p| water_level_record(p, evaluated_at)),
                alerts: alert_drafts(&outcome, &registry),
            };

            (outcome, batch)
        }
        .instrument(span)
        .await
    }

    /// Run cycles on a fixed interval until shutdown is signalled
    ///
    /// Outcomes are offered to `outcomes` without waiting; a full channel
    /// drops the outcome, a closed channel stops the loop.
    pub async fn run(
        &self,
        outcomes: mpsc::Sender<CycleOutcome>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let period = self.config.interval();
        info!("Starting monitor, interval {}s", period.as_secs());

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.run_cycle().await;
                    match outcomes.try_send(outcome) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(dropped)) => {
                            warn!("Outcome channel full, dropping cycle {}", dropped.cycle_id);
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {
                            info!("Outcome receiver closed, stopping monitor");
                            break;
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Monitor shutting down");
                        break;
                    }
                    debug!("Shutdown flag changed but not set");
                }
            }
        }
    }
}
