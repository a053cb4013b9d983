//! Flood Monitor
//!
//! Runs the evaluation cycle on a fixed interval: snapshot the thresholds,
//! fetch every category concurrently, aggregate and classify, merge the
//! alerts, publish the outcome, and hand the records to the recorder.

mod config;
mod monitor;
mod outcome;
mod persist;

pub use config::MonitorConfig;
pub use monitor::Monitor;
pub use outcome::{CycleOutcome, GustSummary, PumpSummary};
