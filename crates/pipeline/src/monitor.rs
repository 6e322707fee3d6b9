//! End-to-End Monitoring Pipeline

use crate::{PipelineConfig, PipelineError, SignalConfig};
use ensemble::{AlertLevel, EnsembleDetector, EnsembleResult, ModelFamily, PredictionReport};
use feature_engine::{build_sequences, FeatureExtractor, FeatureMatrix, FEATURE_NAMES};
use metrics::{counter, histogram};
use ndarray::{s, ArrayView2};
use normalizer::{NormalizationError, StandardNormalizer};
use serde::{Deserialize, Serialize};
use signal_processing::window_signal;
use std::time::Instant;
use tracing::{debug, info};

/// Features extracted from one signal, ready for JSON output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub sample_rate: f64,
    pub window_size: usize,
    pub hop_size: usize,
    pub n_windows: usize,
    /// Whether fitted normalization was applied
    pub normalized: bool,
    pub feature_names: Vec<String>,
    /// One row per window, in `feature_names` order
    pub features: Vec<Vec<f64>>,
}

/// Signal-to-alert pipeline owning the extractor, normalizer, and detectors
#[derive(Debug)]
pub struct MonitoringPipeline {
    signal: SignalConfig,
    sequence_length: usize,
    extractor: FeatureExtractor,
    normalizer: Option<StandardNormalizer>,
    ensemble: EnsembleDetector,
}

impl MonitoringPipeline {
    /// Build a pipeline from validated configuration, loading normalizer
    /// state when a path is configured
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let normalizer = match &config.normalizer.state_path {
            Some(path) => Some(StandardNormalizer::load(path)?),
            None => None,
        };

        info!(
            "Creating monitoring pipeline: sample_rate={}, window={}, hop={}",
            config.signal.sample_rate, config.signal.window_size, config.signal.hop_size
        );

        Ok(Self {
            signal: config.signal.clone(),
            sequence_length: config.ensemble.sequence_length,
            extractor: FeatureExtractor::new(config.signal.sample_rate),
            normalizer,
            ensemble: EnsembleDetector::new(config.ensemble.weights()?)?,
        })
    }

    /// Use an already fitted normalizer
    pub fn with_normalizer(mut self, normalizer: StandardNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Replace the detector set, including its weights
    pub fn with_ensemble(mut self, ensemble: EnsembleDetector) -> Self {
        self.ensemble = ensemble;
        self
    }

    pub fn signal_config(&self) -> &SignalConfig {
        &self.signal
    }

    pub fn normalizer(&self) -> Option<&StandardNormalizer> {
        self.normalizer.as_ref()
    }

    pub fn ensemble(&self) -> &EnsembleDetector {
        &self.ensemble
    }

    /// Window a raw signal and extract the raw feature matrix
    pub fn extract_features(&self, signal: &[f64]) -> Result<FeatureMatrix, PipelineError> {
        let start = Instant::now();

        let windows = window_signal(signal, self.signal.window_size, self.signal.hop_size)?;
        let features = self.extractor.extract(windows.view());

        counter!("vibration_samples_total").increment(signal.len() as u64);
        counter!("vibration_windows_total").increment(features.nrows() as u64);
        histogram!("vibration_extraction_seconds").record(start.elapsed().as_secs_f64());
        debug!(
            "Extracted {} feature rows from {} samples in {:?}",
            features.nrows(),
            signal.len(),
            start.elapsed()
        );

        Ok(features)
    }

    /// Fit normalization on a signal known to come from a healthy machine
    pub fn fit_normalizer(&mut self, normal_signal: &[f64]) -> Result<&StandardNormalizer, PipelineError> {
        if self.normalizer.is_some() {
            return Err(NormalizationError::AlreadyFitted.into());
        }

        let features = self.extract_features(normal_signal)?;
        let mut normalizer = StandardNormalizer::new();
        normalizer.fit(features.view())?;

        Ok(&*self.normalizer.insert(normalizer))
    }

    /// Extract features and normalize them when a normalizer is available
    pub fn prepare(&self, signal: &[f64]) -> Result<FeatureMatrix, PipelineError> {
        let features = self.extract_features(signal)?;
        match &self.normalizer {
            Some(normalizer) => Ok(normalizer.transform(features.view())?),
            None => Ok(features),
        }
    }

    /// Feature rows of one signal as a serializable report
    pub fn feature_report(&self, signal: &[f64]) -> Result<FeatureReport, PipelineError> {
        let features = self.prepare(signal)?;
        Ok(FeatureReport {
            sample_rate: self.signal.sample_rate,
            window_size: self.signal.window_size,
            hop_size: self.signal.hop_size,
            n_windows: features.nrows(),
            normalized: self.normalizer.is_some(),
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            features: features.rows().into_iter().map(|row| row.to_vec()).collect(),
        })
    }

    /// Run the full pipeline on a raw signal
    pub fn analyze(&self, signal: &[f64]) -> Result<EnsembleResult, PipelineError> {
        let features = self.prepare(signal)?;
        self.score(features.view())
    }

    /// Score prepared feature rows with the loaded detectors.
    ///
    /// With a sequence detector loaded, each row is paired with the sequence
    /// ending at it, so the first `sequence_length - 1` rows are not scored.
    pub fn score(&self, features: ArrayView2<'_, f64>) -> Result<EnsembleResult, PipelineError> {
        let result = if self.ensemble.has_model(ModelFamily::Sequence) {
            let sequences = build_sequences(features, self.sequence_length, 1)?;
            let first = (self.sequence_length - 1).min(features.nrows());
            let aligned = features.slice(s![first.., ..]);
            self.ensemble.predict(aligned, Some(sequences.view()))?
        } else {
            self.ensemble.predict(features, None)?
        };

        for level in [AlertLevel::Normal, AlertLevel::Warning, AlertLevel::Critical] {
            counter!("vibration_alerts_total", "level" => level.as_str())
                .increment(result.count_level(level) as u64);
        }
        counter!("vibration_anomalies_total").increment(result.anomaly_count() as u64);

        Ok(result)
    }

    /// Run the full pipeline and build a per-sample report
    pub fn report(&self, signal: &[f64]) -> Result<PredictionReport, PipelineError> {
        Ok(PredictionReport::from(&self.analyze(signal)?))
    }
}

/// Parse samples separated by whitespace or commas. `nan` and `inf` tokens
/// are accepted and later zeroed by windowing.
pub fn parse_signal(text: &str) -> Result<Vec<f64>, PipelineError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| {
            token.parse::<f64>().map_err(|_| PipelineError::Parse {
                position,
                token: token.to_string(),
            })
        })
        .collect()
}
