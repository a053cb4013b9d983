//! Provider Error Types

use normalizer::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Provider returned status {0}")]
    Status(u16),

    /// Response body did not decode
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// No network reported the requested station
    #[error("Station not found: {0}")]
    StationNotFound(String),
}
