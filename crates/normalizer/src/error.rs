//! Normalization Error Types

use thiserror::Error;

/// Why a single field did not produce a usable measurement
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Field absent or empty
    #[error("Missing value")]
    Missing,

    /// Field present but not a number
    #[error("Unparseable value: {0:?}")]
    Unparseable(String),

    /// Provider "no observation" marker, or a negative value for a
    /// quantity that cannot be negative
    #[error("Sentinel value {0}")]
    Sentinel(f64),
}

/// Errors decoding a whole provider payload
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not the expected JSON shape
    #[error("Invalid payload: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    /// Provider envelope reports failure
    #[error("Provider rejected request (success = {0:?})")]
    Rejected(String),
}
