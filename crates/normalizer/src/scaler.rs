//! Standard Score Normalizer

use crate::{NormalizationError, NormalizationState};
use feature_engine::NUM_FEATURES;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Column-wise `(x - mean) / scale` normalizer.
///
/// Statistics are fit once; afterwards the state is shared read-only and can
/// be handed to other threads through [`StandardNormalizer::state`].
#[derive(Debug, Clone)]
pub struct StandardNormalizer {
    /// Width every fit and transform input must have
    expected_features: usize,
    /// Fitted statistics
    state: Option<Arc<NormalizationState>>,
}

impl StandardNormalizer {
    /// Create an unfitted normalizer for the canonical feature schema
    pub fn new() -> Self {
        Self::with_features(NUM_FEATURES)
    }

    /// Create an unfitted normalizer for matrices of `n_features` columns
    pub fn with_features(n_features: usize) -> Self {
        Self {
            expected_features: n_features,
            state: None,
        }
    }

    /// Wrap previously fitted statistics
    pub fn from_state(state: NormalizationState) -> Result<Self, NormalizationError> {
        state.validate(NUM_FEATURES)?;
        Ok(Self {
            expected_features: NUM_FEATURES,
            state: Some(Arc::new(state)),
        })
    }

    /// Whether statistics are available
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Shared handle to the fitted statistics
    pub fn state(&self) -> Option<Arc<NormalizationState>> {
        self.state.clone()
    }

    /// Number of columns this normalizer accepts
    pub fn num_features(&self) -> usize {
        self.expected_features
    }

    /// Fit column statistics on known-normal data
    pub fn fit(&mut self, data: ArrayView2<'_, f64>) -> Result<(), NormalizationError> {
        if self.state.is_some() {
            return Err(NormalizationError::AlreadyFitted);
        }
        if data.ncols() != self.expected_features {
            return Err(NormalizationError::InvalidInput(format!(
                "Expected {} feature columns, got {}",
                self.expected_features,
                data.ncols()
            )));
        }

        let state = NormalizationState::fit(data)?;
        info!(
            "Normalizer fitted: samples={}, features={}",
            data.nrows(),
            state.num_features()
        );
        self.state = Some(Arc::new(state));
        Ok(())
    }

    /// Apply the fitted statistics, returning a new matrix
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, NormalizationError> {
        let state = self.state.as_ref().ok_or(NormalizationError::NotFitted)?;
        if data.ncols() != state.num_features() {
            return Err(NormalizationError::SchemaMismatch {
                expected: state.num_features(),
                actual: data.ncols(),
            });
        }

        debug!("Normalizing {} rows", data.nrows());

        let mean = ArrayView1::from(&state.mean[..]).insert_axis(Axis(0));
        let scale = ArrayView1::from(&state.scale[..]).insert_axis(Axis(0));
        Ok((&data - &mean) / &scale)
    }

    /// Fit on `data`, then transform it
    pub fn fit_transform(&mut self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, NormalizationError> {
        self.fit(data)?;
        self.transform(data)
    }

    /// Encode the fitted statistics as a compact binary blob
    pub fn to_bytes(&self) -> Result<Vec<u8>, NormalizationError> {
        let state = self.state.as_ref().ok_or(NormalizationError::NotFitted)?;
        Ok(postcard::to_allocvec(state.as_ref())?)
    }

    /// Restore a normalizer from a blob produced by [`Self::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NormalizationError> {
        let state: NormalizationState = postcard::from_bytes(bytes)?;
        Self::from_state(state)
    }

    /// Write the fitted statistics to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), NormalizationError> {
        let state = self.state.as_ref().ok_or(NormalizationError::NotFitted)?;
        let json = serde_json::to_string_pretty(state.as_ref())?;
        fs::write(path.as_ref(), json)?;
        info!("Normalizer state saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Read statistics previously written by [`Self::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NormalizationError> {
        let json = fs::read_to_string(path.as_ref())?;
        let state: NormalizationState = serde_json::from_str(&json)?;
        let normalizer = Self::from_state(state)?;
        info!("Normalizer state loaded from {}", path.as_ref().display());
        Ok(normalizer)
    }
}

impl Default for StandardNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
