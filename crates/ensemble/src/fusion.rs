//! Weighted Score Fusion

use crate::alert::{is_anomaly, AlertLevel};
use crate::{EnsembleError, ModelFamily};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Absolute tolerance on the weight sum
const WEIGHT_ABS_TOLERANCE: f64 = 1e-8;
/// Relative tolerance on the weight sum
const WEIGHT_REL_TOLERANCE: f64 = 1e-5;
/// Score ranges narrower than this rescale to all zeros
const DEGENERATE_RANGE: f64 = 1e-10;

/// Contribution of each detector family to the fused score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Reconstruction-error model weight
    pub autoencoder: f64,
    /// Isolation model weight
    pub isolation_forest: f64,
    /// Sequence model weight
    pub sequence: f64,
}

impl FusionWeights {
    /// Create validated weights
    pub fn new(autoencoder: f64, isolation_forest: f64, sequence: f64) -> Result<Self, EnsembleError> {
        let weights = Self {
            autoencoder,
            isolation_forest,
            sequence,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Sum of all three weights
    pub fn sum(&self) -> f64 {
        self.autoencoder + self.isolation_forest + self.sequence
    }

    /// Weight for one family
    pub fn get(&self, family: ModelFamily) -> f64 {
        match family {
            ModelFamily::Autoencoder => self.autoencoder,
            ModelFamily::IsolationForest => self.isolation_forest,
            ModelFamily::Sequence => self.sequence,
        }
    }

    /// Weights must be finite, non-negative, and sum to 1.0
    pub fn validate(&self) -> Result<(), EnsembleError> {
        let sum = self.sum();
        let values = [self.autoencoder, self.isolation_forest, self.sequence];

        let reason = if values.iter().any(|w| !w.is_finite()) {
            Some("weights must be finite")
        } else if values.iter().any(|&w| w < 0.0) {
            Some("weights must be non-negative")
        } else if (sum - 1.0).abs() > WEIGHT_ABS_TOLERANCE + WEIGHT_REL_TOLERANCE {
            Some("weights must sum to 1.0")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(EnsembleError::InvalidConfiguration {
                sum,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            autoencoder: 0.4,
            isolation_forest: 0.3,
            sequence: 0.3,
        }
    }
}

/// Raw per-sample scores from whichever detectors are present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelScores {
    /// Samples every present score vector must cover
    pub n_samples: usize,
    /// Reconstruction errors, any non-negative scale
    pub autoencoder: Option<Vec<f64>>,
    /// Isolation scores in [0, 1]
    pub isolation_forest: Option<Vec<f64>>,
    /// Sequence model probabilities in [0, 1]
    pub sequence: Option<Vec<f64>>,
}

impl ModelScores {
    /// Start an empty score set for `n_samples` samples
    pub fn new(n_samples: usize) -> Self {
        Self {
            n_samples,
            ..Self::default()
        }
    }

    pub fn with_autoencoder(mut self, scores: Vec<f64>) -> Self {
        self.autoencoder = Some(scores);
        self
    }

    pub fn with_isolation_forest(mut self, scores: Vec<f64>) -> Self {
        self.isolation_forest = Some(scores);
        self
    }

    pub fn with_sequence(mut self, scores: Vec<f64>) -> Self {
        self.sequence = Some(scores);
        self
    }

    /// Scores of one family, if present
    pub fn get(&self, family: ModelFamily) -> Option<&[f64]> {
        match family {
            ModelFamily::Autoencoder => self.autoencoder.as_deref(),
            ModelFamily::IsolationForest => self.isolation_forest.as_deref(),
            ModelFamily::Sequence => self.sequence.as_deref(),
        }
    }

    /// Families that contributed scores
    pub fn present(&self) -> impl Iterator<Item = ModelFamily> + '_ {
        ModelFamily::ALL
            .into_iter()
            .filter(move |family| self.get(*family).is_some())
    }

    fn validate(&self) -> Result<(), EnsembleError> {
        for family in self.present() {
            let scores = self.get(family).unwrap_or_default();
            if scores.len() != self.n_samples {
                return Err(EnsembleError::InvalidInput(format!(
                    "{} produced {} scores for {} samples",
                    family,
                    scores.len(),
                    self.n_samples
                )));
            }
            if scores.iter().any(|s| !s.is_finite()) {
                return Err(EnsembleError::InvalidInput(format!(
                    "{} scores contain non-finite values",
                    family
                )));
            }
            if family == ModelFamily::Autoencoder && scores.iter().any(|&s| s < 0.0) {
                return Err(EnsembleError::InvalidInput(format!(
                    "{} scores must be non-negative",
                    family
                )));
            }
            if family != ModelFamily::Autoencoder && scores.iter().any(|s| !(0.0..=1.0).contains(s)) {
                return Err(EnsembleError::InvalidInput(format!(
                    "{} scores must lie in [0, 1]",
                    family
                )));
            }
        }
        Ok(())
    }
}

/// Fused decision for a batch of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    /// Fused score per sample, in [0, 1]
    pub scores: Vec<f64>,
    /// `score > 0.5`
    pub labels: Vec<bool>,
    /// Tier per sample
    pub alert_levels: Vec<AlertLevel>,
    /// Scores as the detectors produced them, before rescaling
    pub individual: ModelScores,
    /// Weights of the families that contributed
    pub weights: BTreeMap<ModelFamily, f64>,
}

impl EnsembleResult {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Samples labeled anomalous
    pub fn anomaly_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }

    /// Samples in a given tier
    pub fn count_level(&self, level: AlertLevel) -> usize {
        self.alert_levels.iter().filter(|&&l| l == level).count()
    }
}

/// Weighted combination of detector scores.
///
/// Weights can be updated from any thread; each `fuse` call reads one
/// consistent snapshot.
#[derive(Debug)]
pub struct EnsembleFusion {
    weights: RwLock<FusionWeights>,
}

impl EnsembleFusion {
    /// Create a fusion engine with validated weights
    pub fn new(weights: FusionWeights) -> Result<Self, EnsembleError> {
        weights.validate()?;
        info!("Creating ensemble fusion with weights: {:?}", weights);
        Ok(Self {
            weights: RwLock::new(weights),
        })
    }

    /// Current weights
    pub fn weights(&self) -> FusionWeights {
        *self.weights.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the weights; rejected weights leave the old ones in place
    pub fn set_weights(&self, weights: FusionWeights) -> Result<(), EnsembleError> {
        weights.validate()?;
        *self.weights.write().unwrap_or_else(PoisonError::into_inner) = weights;
        info!("Ensemble weights updated: {:?}", weights);
        Ok(())
    }

    /// Fuse per-model scores into final scores, labels, and tiers
    pub fn fuse(&self, scores: &ModelScores) -> Result<EnsembleResult, EnsembleError> {
        scores.validate()?;

        let weights = self.weights();
        let mut fused = vec![0.0; scores.n_samples];
        let mut active = BTreeMap::new();

        for family in scores.present() {
            let raw = scores.get(family).unwrap_or_default();
            let contribution = match family {
                // Batch-relative rescaling
                ModelFamily::Autoencoder => normalize_scores(raw),
                _ => raw.to_vec(),
            };
            let weight = weights.get(family);
            for (total, s) in fused.iter_mut().zip(&contribution) {
                *total += weight * s;
            }
            active.insert(family, weight);
        }

        // Weight sum tolerance can push a perfect score a hair above 1
        for score in fused.iter_mut() {
            *score = score.clamp(0.0, 1.0);
        }

        let labels = fused.iter().map(|&s| is_anomaly(s)).collect();
        let alert_levels = fused.iter().map(|&s| AlertLevel::from_score(s)).collect();

        debug!(
            "Fused {} samples from {} models",
            scores.n_samples,
            active.len()
        );

        Ok(EnsembleResult {
            scores: fused,
            labels,
            alert_levels,
            individual: scores.clone(),
            weights: active,
        })
    }
}

impl Default for EnsembleFusion {
    fn default() -> Self {
        Self {
            weights: RwLock::new(FusionWeights::default()),
        }
    }
}

/// Min-max rescale to [0, 1]; a range below 1e-10 maps everything to 0.
///
/// Differences are taken on halved values so that any finite input has a
/// finite range.
pub fn normalize_scores(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let half_range = max / 2.0 - min / 2.0;

    if half_range.is_nan() || half_range < DEGENERATE_RANGE / 2.0 {
        if scores.len() > 1 {
            warn!(
                "Degenerate score range {:e}; rescaled scores set to zero",
                2.0 * half_range
            );
        }
        return vec![0.0; scores.len()];
    }

    scores
        .iter()
        .map(|s| ((s / 2.0 - min / 2.0) / half_range).clamp(0.0, 1.0))
        .collect()
}

/// Map isolation decision values (lower is more anomalous) onto [0, 1],
/// 1 being most anomalous
pub fn normalize_isolation_scores(decision: &[f64]) -> Vec<f64> {
    let negated: Vec<f64> = decision.iter().map(|d| -d).collect();
    normalize_scores(&negated)
}
