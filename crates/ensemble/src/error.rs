//! Ensemble Error Types

use thiserror::Error;

/// Errors raised while configuring or running the ensemble
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnsembleError {
    /// Fusion weights rejected
    #[error("Invalid weights: {reason} (sum = {sum})")]
    InvalidConfiguration { sum: f64, reason: String },

    /// A present model has no input to run on
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Malformed scores or feature arrays
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An external detector failed
    #[error("Detector {model} failed: {message}")]
    Detector { model: String, message: String },
}
