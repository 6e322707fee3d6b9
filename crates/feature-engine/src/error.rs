//! Feature Extraction Error Types

use signal_processing::SignalError;
use thiserror::Error;

/// Errors during feature extraction and sequence assembly
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Malformed shape, dimensionality, or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream windowing failure
    #[error(transparent)]
    Signal(#[from] SignalError),
}
