//! Ensemble Anomaly Scoring
//!
//! Combines the opinions of up to three detector families (reconstruction,
//! isolation, sequence) into one score per sample, then maps that score to
//! a binary label and a three-tier alert level.

mod alert;
mod detector;
mod detector_set;
mod error;
mod fusion;
mod summary;

pub use alert::{is_anomaly, AlertLevel, ANOMALY_THRESHOLD, CRITICAL_THRESHOLD, WARNING_THRESHOLD};
pub use detector::{
    percentile_threshold, DetectorOutput, FeatureDetector, ModelFamily, SequenceDetector,
};
pub use detector_set::{EnsembleDetector, ModelStatus, ModelSummary};
pub use error::EnsembleError;
pub use fusion::{
    normalize_isolation_scores, normalize_scores, EnsembleFusion, EnsembleResult, FusionWeights,
    ModelScores,
};
pub use summary::{BatchSummary, PredictionReport, SamplePrediction};
