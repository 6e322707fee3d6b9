//! Per-Sample Reports and Batch Summaries

use crate::{AlertLevel, EnsembleResult, ModelFamily};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decision for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePrediction {
    pub sample_index: usize,
    pub ensemble_score: f64,
    pub alert_level: AlertLevel,
    pub is_anomaly: bool,
    /// Raw score from each detector that ran
    pub individual_scores: BTreeMap<ModelFamily, f64>,
}

/// Aggregate counts over a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_samples: usize,
    pub anomalies_detected: usize,
    pub normal_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    /// Mean fused score; 0.0 for an empty batch
    pub avg_ensemble_score: f64,
}

impl BatchSummary {
    pub fn from_result(result: &EnsembleResult) -> Self {
        let avg_ensemble_score = if result.is_empty() {
            0.0
        } else {
            result.scores.iter().sum::<f64>() / result.len() as f64
        };

        Self {
            total_samples: result.len(),
            anomalies_detected: result.anomaly_count(),
            normal_count: result.count_level(AlertLevel::Normal),
            warning_count: result.count_level(AlertLevel::Warning),
            critical_count: result.count_level(AlertLevel::Critical),
            avg_ensemble_score,
        }
    }

    /// Most severe tier present in the batch
    pub fn worst_level(&self) -> Option<AlertLevel> {
        if self.critical_count > 0 {
            Some(AlertLevel::Critical)
        } else if self.warning_count > 0 {
            Some(AlertLevel::Warning)
        } else if self.normal_count > 0 {
            Some(AlertLevel::Normal)
        } else {
            None
        }
    }
}

/// Full per-sample listing plus summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub predictions: Vec<SamplePrediction>,
    pub summary: BatchSummary,
}

impl From<&EnsembleResult> for PredictionReport {
    fn from(result: &EnsembleResult) -> Self {
        let predictions = (0..result.len())
            .map(|i| SamplePrediction {
                sample_index: i,
                ensemble_score: result.scores[i],
                alert_level: result.alert_levels[i],
                is_anomaly: result.labels[i],
                individual_scores: result
                    .individual
                    .present()
                    .filter_map(|family| {
                        result.individual.get(family).map(|scores| (family, scores[i]))
                    })
                    .collect(),
            })
            .collect();

        Self {
            predictions,
            summary: BatchSummary::from_result(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnsembleFusion, ModelScores};

    #[test]
    fn test_summary_counts() {
        let fusion = EnsembleFusion::default();
        let scores = ModelScores::new(4)
            .with_isolation_forest(vec![0.0, 1.0, 1.0, 1.0])
            .with_sequence(vec![0.0, 0.0, 1.0, 1.0])
            .with_autoencoder(vec![0.0, 0.0, 0.0, 1.0]);
        let result = fusion.fuse(&scores).unwrap();
        let summary = BatchSummary::from_result(&result);

        assert_eq!(summary.total_samples, 4);
        assert_eq!(summary.normal_count, 1);
        assert_eq!(summary.warning_count, 2);
        assert_eq!(summary.critical_count, 1);
        assert_eq!(summary.anomalies_detected, 2);
        assert!((summary.avg_ensemble_score - 0.475).abs() < 1e-12);
        assert_eq!(summary.worst_level(), Some(AlertLevel::Critical));
    }

    #[test]
    fn test_empty_summary() {
        let result = EnsembleFusion::default().fuse(&ModelScores::new(0)).unwrap();
        let summary = BatchSummary::from_result(&result);
        assert_eq!(summary, BatchSummary::default());
        assert_eq!(summary.worst_level(), None);
    }

    #[test]
    fn test_report_serialization() {
        let fusion = EnsembleFusion::default();
        let scores = ModelScores::new(2)
            .with_autoencoder(vec![3.0, 9.0])
            .with_isolation_forest(vec![0.1, 0.9]);
        let report = PredictionReport::from(&fusion.fuse(&scores).unwrap());

        assert_eq!(report.predictions.len(), 2);
        let second = &report.predictions[1];
        assert_eq!(second.sample_index, 1);
        assert_eq!(second.individual_scores[&ModelFamily::Autoencoder], 9.0);
        assert!(!second.individual_scores.contains_key(&ModelFamily::Sequence));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["predictions"][1]["alert_level"], "warning");
        assert_eq!(json["predictions"][1]["individual_scores"]["isolation_forest"], 0.9);
        assert_eq!(json["summary"]["total_samples"], 2);
    }
}
