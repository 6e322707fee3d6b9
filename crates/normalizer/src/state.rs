//! Fitted Normalization Statistics

use crate::{NormalizationError, MIN_SCALE};
use feature_engine::FEATURE_SCHEMA_VERSION;
use ndarray::{ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Per-column mean and scale, immutable once fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationState {
    /// Feature schema the statistics were fit against
    pub schema_version: u32,
    /// Column means
    pub mean: Vec<f64>,
    /// Column population standard deviations (1.0 for constant columns)
    pub scale: Vec<f64>,
}

impl NormalizationState {
    /// Compute statistics from a `(samples, features)` matrix
    pub fn fit(data: ArrayView2<'_, f64>) -> Result<Self, NormalizationError> {
        let (n_samples, n_features) = data.dim();
        if n_samples == 0 || n_features == 0 {
            return Err(NormalizationError::InvalidInput(format!(
                "Cannot fit on an empty matrix of shape ({}, {})",
                n_samples, n_features
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(NormalizationError::InvalidInput(
                "Fit data contains non-finite values".to_string(),
            ));
        }

        let n = n_samples as f64;
        let mut mean = Vec::with_capacity(n_features);
        let mut scale = Vec::with_capacity(n_features);
        for column in data.axis_iter(Axis(1)) {
            let m = column.sum() / n;
            let var = column.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            mean.push(m);
            scale.push(if std < MIN_SCALE { 1.0 } else { std });
        }

        Ok(Self {
            schema_version: FEATURE_SCHEMA_VERSION,
            mean,
            scale,
        })
    }

    /// Number of features the statistics cover
    pub fn num_features(&self) -> usize {
        self.mean.len()
    }

    /// Check internal consistency and compatibility with `expected_features`
    pub fn validate(&self, expected_features: usize) -> Result<(), NormalizationError> {
        if self.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(NormalizationError::InvalidInput(format!(
                "State was fit against schema version {}, current is {}",
                self.schema_version, FEATURE_SCHEMA_VERSION
            )));
        }
        if self.mean.len() != self.scale.len() {
            return Err(NormalizationError::InvalidInput(format!(
                "State has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.len() != expected_features {
            return Err(NormalizationError::SchemaMismatch {
                expected: expected_features,
                actual: self.mean.len(),
            });
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0)
            || self.mean.iter().any(|m| !m.is_finite())
        {
            return Err(NormalizationError::InvalidInput(
                "State contains non-finite means or non-positive scales".to_string(),
            ));
        }
        Ok(())
    }
}
