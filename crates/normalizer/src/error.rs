//! Normalization Error Types

use thiserror::Error;

/// Errors during fitting, transforming, or persisting normalization state
#[derive(Debug, Error)]
pub enum NormalizationError {
    /// Malformed fit data or state
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transform requested before fit
    #[error("Normalizer has not been fitted")]
    NotFitted,

    /// Statistics already fit; state is write-once
    #[error("Normalizer is already fitted")]
    AlreadyFitted,

    /// Feature count does not match the fitted schema
    #[error("Schema mismatch: expected {expected} features, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// State could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// State file could not be read or written
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for NormalizationError {
    fn from(err: serde_json::Error) -> Self {
        NormalizationError::Serialization(err.to_string())
    }
}

impl From<postcard::Error> for NormalizationError {
    fn from(err: postcard::Error) -> Self {
        NormalizationError::Serialization(err.to_string())
    }
}
