//! Ensemble Detector
//!
//! Owns whichever detectors have been loaded plus the fusion weights, and
//! runs a full predict-and-fuse pass over a feature batch.

use crate::{
    DetectorOutput, EnsembleError, EnsembleFusion, EnsembleResult, FeatureDetector, FusionWeights,
    ModelFamily, ModelScores, SequenceDetector,
};
use ndarray::{ArrayView2, ArrayView3, ArrayViewD, Ix2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Availability of one detector family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub family: ModelFamily,
    pub loaded: bool,
    /// Raw-score threshold reported by the detector
    pub threshold: Option<f64>,
    pub weight: f64,
}

/// Which detectors are loaded and how they are weighted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub models: Vec<ModelStatus>,
    pub weights: FusionWeights,
}

impl ModelSummary {
    /// Whether at least one detector is loaded
    pub fn any_loaded(&self) -> bool {
        self.models.iter().any(|m| m.loaded)
    }
}

/// Set of optional detectors combined by [`EnsembleFusion`]
pub struct EnsembleDetector {
    autoencoder: Option<Box<dyn FeatureDetector>>,
    isolation_forest: Option<Box<dyn FeatureDetector>>,
    sequence: Option<Box<dyn SequenceDetector>>,
    fusion: EnsembleFusion,
}

impl EnsembleDetector {
    /// Create an ensemble with no detectors loaded
    pub fn new(weights: FusionWeights) -> Result<Self, EnsembleError> {
        Ok(Self {
            autoencoder: None,
            isolation_forest: None,
            sequence: None,
            fusion: EnsembleFusion::new(weights)?,
        })
    }

    /// Attach the reconstruction-error detector
    pub fn with_autoencoder(mut self, detector: impl FeatureDetector + 'static) -> Self {
        self.autoencoder = Some(Box::new(detector));
        self
    }

    /// Attach the isolation detector
    pub fn with_isolation_forest(mut self, detector: impl FeatureDetector + 'static) -> Self {
        self.isolation_forest = Some(Box::new(detector));
        self
    }

    /// Attach the sequence detector
    pub fn with_sequence_model(mut self, detector: impl SequenceDetector + 'static) -> Self {
        self.sequence = Some(Box::new(detector));
        self
    }

    /// Whether a detector of `family` is loaded
    pub fn has_model(&self, family: ModelFamily) -> bool {
        match family {
            ModelFamily::Autoencoder => self.autoencoder.is_some(),
            ModelFamily::IsolationForest => self.isolation_forest.is_some(),
            ModelFamily::Sequence => self.sequence.is_some(),
        }
    }

    /// Current fusion weights
    pub fn weights(&self) -> FusionWeights {
        self.fusion.weights()
    }

    /// Replace the fusion weights
    pub fn set_weights(&self, weights: FusionWeights) -> Result<(), EnsembleError> {
        self.fusion.set_weights(weights)
    }

    /// Score a `(samples, features)` batch.
    ///
    /// `sequences` is required when a sequence detector is loaded and must
    /// hold one sequence per feature row.
    pub fn predict(
        &self,
        features: ArrayView2<'_, f64>,
        sequences: Option<ArrayView3<'_, f64>>,
    ) -> Result<EnsembleResult, EnsembleError> {
        if self.sequence.is_some() && sequences.is_none() {
            return Err(EnsembleError::MissingInput(
                "sequences are required when a sequence model is loaded".to_string(),
            ));
        }

        let n_samples = features.nrows();
        debug!("Running ensemble on {} samples", n_samples);

        let mut scores = ModelScores::new(n_samples);
        if let Some(detector) = &self.autoencoder {
            let output = detector.predict(features)?;
            scores.autoencoder = Some(checked(ModelFamily::Autoencoder, output)?);
        }
        if let Some(detector) = &self.isolation_forest {
            let output = detector.predict(features)?;
            scores.isolation_forest = Some(checked(ModelFamily::IsolationForest, output)?);
        }
        if let (Some(detector), Some(sequences)) = (&self.sequence, sequences) {
            let output = detector.predict(sequences)?;
            scores.sequence = Some(checked(ModelFamily::Sequence, output)?);
        }

        self.fusion.fuse(&scores)
    }

    /// Score a feature array of arbitrary dimensionality, rejecting anything but 2-D
    pub fn predict_dyn(
        &self,
        features: ArrayViewD<'_, f64>,
        sequences: Option<ArrayView3<'_, f64>>,
    ) -> Result<EnsembleResult, EnsembleError> {
        let ndim = features.ndim();
        let features = features.into_dimensionality::<Ix2>().map_err(|_| {
            EnsembleError::InvalidInput(format!("Features must be a 2-D array, got ndim={}", ndim))
        })?;
        self.predict(features, sequences)
    }

    /// Loaded detectors, their thresholds, and the configured weights
    pub fn model_summary(&self) -> ModelSummary {
        let weights = self.weights();
        let models = ModelFamily::ALL
            .into_iter()
            .map(|family| {
                let threshold = match family {
                    ModelFamily::Autoencoder => self.autoencoder.as_ref().and_then(|d| d.threshold()),
                    ModelFamily::IsolationForest => {
                        self.isolation_forest.as_ref().and_then(|d| d.threshold())
                    }
                    ModelFamily::Sequence => self.sequence.as_ref().and_then(|d| d.threshold()),
                };
                ModelStatus {
                    family,
                    loaded: self.has_model(family),
                    threshold,
                    weight: weights.get(family),
                }
            })
            .collect();

        ModelSummary { models, weights }
    }
}

impl Default for EnsembleDetector {
    fn default() -> Self {
        Self {
            autoencoder: None,
            isolation_forest: None,
            sequence: None,
            fusion: EnsembleFusion::default(),
        }
    }
}

impl std::fmt::Debug for EnsembleDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsembleDetector")
            .field("autoencoder", &self.autoencoder.is_some())
            .field("isolation_forest", &self.isolation_forest.is_some())
            .field("sequence", &self.sequence.is_some())
            .field("weights", &self.weights())
            .finish()
    }
}

/// Reject detector outputs whose labels and scores disagree in length
fn checked(family: ModelFamily, output: DetectorOutput) -> Result<Vec<f64>, EnsembleError> {
    if output.labels.len() != output.scores.len() {
        return Err(EnsembleError::Detector {
            model: family.to_string(),
            message: format!(
                "returned {} scores but {} labels",
                output.scores.len(),
                output.labels.len()
            ),
        });
    }
    debug!("{} scored {} samples", family, output.len());
    Ok(output.scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlertLevel;
    use ndarray::{Array2, Array3, ArrayD, IxDyn};

    /// Scores each row by its first column
    struct FirstColumn {
        threshold: f64,
    }

    impl FeatureDetector for FirstColumn {
        fn predict(&self, features: ArrayView2<'_, f64>) -> Result<DetectorOutput, EnsembleError> {
            let scores: Vec<f64> = features.column(0).to_vec();
            let labels = scores.iter().map(|&s| s > self.threshold).collect();
            Ok(DetectorOutput { scores, labels })
        }

        fn threshold(&self) -> Option<f64> {
            Some(self.threshold)
        }
    }

    /// Constant probability per sequence
    struct ConstantSequence(f64);

    impl SequenceDetector for ConstantSequence {
        fn predict(&self, sequences: ArrayView3<'_, f64>) -> Result<DetectorOutput, EnsembleError> {
            let n = sequences.dim().0;
            Ok(DetectorOutput {
                scores: vec![self.0; n],
                labels: vec![self.0 > 0.5; n],
            })
        }
    }

    struct Failing;

    impl FeatureDetector for Failing {
        fn predict(&self, _: ArrayView2<'_, f64>) -> Result<DetectorOutput, EnsembleError> {
            Err(EnsembleError::Detector {
                model: "autoencoder".to_string(),
                message: "weights not loaded".to_string(),
            })
        }
    }

    fn features() -> Array2<f64> {
        Array2::from_shape_fn((4, 30), |(r, c)| if c == 0 { r as f64 } else { 0.0 })
    }

    #[test]
    fn test_missing_sequences() {
        let ensemble = EnsembleDetector::default().with_sequence_model(ConstantSequence(0.2));
        assert!(matches!(
            ensemble.predict(features().view(), None),
            Err(EnsembleError::MissingInput(_))
        ));
    }

    #[test]
    fn test_predict_with_all_models() {
        let ensemble = EnsembleDetector::default()
            .with_autoencoder(FirstColumn { threshold: 2.5 })
            .with_isolation_forest(FirstColumn { threshold: 0.5 }.scaled())
            .with_sequence_model(ConstantSequence(1.0));

        let sequences = Array3::<f64>::zeros((4, 5, 30));
        let result = ensemble.predict(features().view(), Some(sequences.view())).unwrap();

        assert_eq!(result.len(), 4);
        // Row 0: 0.4 * 0 + 0.3 * 0 + 0.3 * 1
        assert!((result.scores[0] - 0.3).abs() < 1e-12);
        assert_eq!(result.alert_levels[0], AlertLevel::Warning);
        // Row 3: everything maxed
        assert!((result.scores[3] - 1.0).abs() < 1e-12);
        assert_eq!(result.alert_levels[3], AlertLevel::Critical);
        assert!(result.labels[3]);
    }

    #[test]
    fn test_sequence_count_must_match_rows() {
        let ensemble = EnsembleDetector::default().with_sequence_model(ConstantSequence(0.1));
        let sequences = Array3::<f64>::zeros((2, 5, 30));
        assert!(matches!(
            ensemble.predict(features().view(), Some(sequences.view())),
            Err(EnsembleError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_detector_failure_propagates() {
        let ensemble = EnsembleDetector::default().with_autoencoder(Failing);
        assert!(matches!(
            ensemble.predict(features().view(), None),
            Err(EnsembleError::Detector { .. })
        ));
    }

    #[test]
    fn test_predict_dyn_rejects_non_2d() {
        let ensemble = EnsembleDetector::default();
        let flat = ArrayD::<f64>::zeros(IxDyn(&[30]));
        assert!(matches!(
            ensemble.predict_dyn(flat.view(), None),
            Err(EnsembleError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_model_summary() {
        let ensemble = EnsembleDetector::new(FusionWeights::new(0.5, 0.5, 0.0).unwrap())
            .unwrap()
            .with_autoencoder(FirstColumn { threshold: 1.25 });

        let summary = ensemble.model_summary();
        assert!(summary.any_loaded());
        assert_eq!(summary.models.len(), 3);
        assert_eq!(summary.models[0].threshold, Some(1.25));
        assert!(!summary.models[1].loaded);
        assert_eq!(summary.models[1].weight, 0.5);
        assert_eq!(summary.weights.sequence, 0.0);
    }

    impl FirstColumn {
        /// Isolation-style variant producing scores in [0, 1]
        fn scaled(self) -> ScaledFirstColumn {
            ScaledFirstColumn(self)
        }
    }

    struct ScaledFirstColumn(FirstColumn);

    impl FeatureDetector for ScaledFirstColumn {
        fn predict(&self, features: ArrayView2<'_, f64>) -> Result<DetectorOutput, EnsembleError> {
            let raw = self.0.predict(features)?;
            let max = raw.scores.iter().copied().fold(0.0, f64::max).max(1.0);
            let scores: Vec<f64> = raw.scores.iter().map(|s| s / max).collect();
            let labels = scores.iter().map(|&s| s > self.0.threshold).collect();
            Ok(DetectorOutput { scores, labels })
        }
    }
}
