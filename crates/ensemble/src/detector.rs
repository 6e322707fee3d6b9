//! Detector Contracts
//!
//! Learned models live outside this crate. Each one is consumed only through
//! a `predict` call returning one score and one label per sample.

use crate::EnsembleError;
use ndarray::{ArrayView2, ArrayView3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three detector families the ensemble knows how to weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// Reconstruction-error model; scores are unbounded
    Autoencoder,
    /// Isolation-based outlier model; scores in [0, 1]
    IsolationForest,
    /// Temporal model over feature sequences; scores in [0, 1]
    Sequence,
}

impl ModelFamily {
    /// All families in fusion order
    pub const ALL: [ModelFamily; 3] = [
        ModelFamily::Autoencoder,
        ModelFamily::IsolationForest,
        ModelFamily::Sequence,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Autoencoder => "autoencoder",
            ModelFamily::IsolationForest => "isolation_forest",
            ModelFamily::Sequence => "sequence",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-sample scores and labels from one detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorOutput {
    /// Anomaly score, higher is more anomalous
    pub scores: Vec<f64>,
    /// Detector's own binary decision
    pub labels: Vec<bool>,
}

impl DetectorOutput {
    /// Number of samples scored
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no samples were scored
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Detector over `(samples, features)` matrices
pub trait FeatureDetector: Send + Sync {
    /// Score every row
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<DetectorOutput, EnsembleError>;

    /// Decision threshold on the raw score, when the model has one
    fn threshold(&self) -> Option<f64> {
        None
    }
}

/// Detector over `(sequences, timesteps, features)` tensors
pub trait SequenceDetector: Send + Sync {
    /// Score every sequence
    fn predict(&self, sequences: ArrayView3<'_, f64>) -> Result<DetectorOutput, EnsembleError>;

    /// Decision threshold on the score, when the model has one
    fn threshold(&self) -> Option<f64> {
        None
    }
}

/// Linearly interpolated percentile of `scores`, used to place a
/// reconstruction threshold from errors on known-normal validation data.
pub fn percentile_threshold(scores: &[f64], percentile: f64) -> Result<f64, EnsembleError> {
    if scores.is_empty() {
        return Err(EnsembleError::InvalidInput(
            "Cannot compute a threshold from zero scores".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&percentile) {
        return Err(EnsembleError::InvalidInput(format!(
            "Percentile must be within [0, 100], got {}",
            percentile
        )));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(EnsembleError::InvalidInput(
            "Scores contain non-finite values".to_string(),
        ));
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
