//! Threshold Error Types

use crate::Category;
use thiserror::Error;

/// Errors raised while validating or loading thresholds
#[derive(Debug, Error)]
pub enum ThresholdError {
    /// Tier boundaries are not strictly ascending
    #[error("{category} thresholds out of order: warning {warning}, danger {danger}, critical {critical:?}")]
    OutOfOrder {
        category: Category,
        warning: f64,
        danger: f64,
        critical: Option<f64>,
    },

    /// A boundary is NaN or infinite
    #[error("{category} threshold is not a finite number")]
    NotFinite { category: Category },

    /// Category name not recognized
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Backing store could not be read
    #[error("Threshold store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration source could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
