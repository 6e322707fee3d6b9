//! Signal Error Types

use thiserror::Error;

/// Errors raised while validating or windowing a signal
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// Malformed shape, dimensionality, or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
