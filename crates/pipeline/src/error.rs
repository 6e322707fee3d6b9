//! Pipeline Error Types

use ensemble::EnsembleError;
use feature_engine::FeatureError;
use normalizer::NormalizationError;
use signal_processing::SignalError;
use thiserror::Error;

/// Any failure along the signal-to-alert path
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Ensemble(#[from] EnsembleError),

    /// Configuration sources could not be read or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Signal text could not be parsed
    #[error("Invalid sample {token:?} at position {position}")]
    Parse { position: usize, token: String },

    /// Global subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
