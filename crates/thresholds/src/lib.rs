//! Threshold Registry
//!
//! Tiered warning/danger/critical boundaries for every monitored category,
//! compiled-in defaults, and the store interface used for administrative
//! overrides.

mod category;
mod error;
mod registry;
mod store;

pub use category::Category;
pub use error::ThresholdError;
pub use registry::{ThresholdRegistry, ThresholdSet};
pub use store::{
    FileThresholdStore, StaticThresholdStore, ThresholdOverride, ThresholdOverrides,
    ThresholdStore,
};
