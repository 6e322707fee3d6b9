//! Pipeline Configuration
//!
//! Layered from an optional TOML file and `VIBRATION__`-prefixed environment
//! variables, e.g. `VIBRATION__SIGNAL__HOP_SIZE=256`.

use crate::PipelineError;
use ::config::{Config, Environment, File};
use ensemble::FusionWeights;
use serde::{Deserialize, Serialize};
use signal_processing::{DEFAULT_HOP_SIZE, DEFAULT_WINDOW_SIZE, SAMPLE_RATE};
use std::path::{Path, PathBuf};
use tracing::info;

/// Config file looked up in the working directory when none is given
const DEFAULT_CONFIG_NAME: &str = "vibration-monitor";

/// Environment variable prefix
const ENV_PREFIX: &str = "VIBRATION";

/// Signal acquisition and windowing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Sampling frequency (Hz)
    pub sample_rate: f64,
    /// Samples per window
    pub window_size: usize,
    /// Samples between window starts
    pub hop_size: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            window_size: DEFAULT_WINDOW_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
        }
    }
}

/// Fusion weights and sequence assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub autoencoder_weight: f64,
    pub isolation_forest_weight: f64,
    pub sequence_weight: f64,
    /// Timesteps per sequence fed to the sequence detector
    pub sequence_length: usize,
}

impl EnsembleConfig {
    /// Validated fusion weights
    pub fn weights(&self) -> Result<FusionWeights, PipelineError> {
        Ok(FusionWeights::new(
            self.autoencoder_weight,
            self.isolation_forest_weight,
            self.sequence_weight,
        )?)
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        let weights = FusionWeights::default();
        Self {
            autoencoder_weight: weights.autoencoder,
            isolation_forest_weight: weights.isolation_forest,
            sequence_weight: weights.sequence,
            sequence_length: 100,
        }
    }
}

/// Persisted normalizer state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// JSON state written by a previous fit
    pub state_path: Option<PathBuf>,
}

/// Log output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub signal: SignalConfig,
    pub ensemble: EnsembleConfig,
    pub normalizer: NormalizerConfig,
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Load from `path` (required when given) or the optional default file,
    /// then apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config: PipelineConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Log the effective settings; call once the subscriber is installed
    pub fn log_summary(&self) {
        info!(
            "Configuration loaded: sample_rate={}, window={}, hop={}, weights=({}, {}, {}), sequence_length={}, normalizer_state={:?}",
            self.signal.sample_rate,
            self.signal.window_size,
            self.signal.hop_size,
            self.ensemble.autoencoder_weight,
            self.ensemble.isolation_forest_weight,
            self.ensemble.sequence_weight,
            self.ensemble.sequence_length,
            self.normalizer.state_path,
        );
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), PipelineError> {
        let signal = &self.signal;
        if !signal.sample_rate.is_finite() || signal.sample_rate <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "sample_rate must be positive, got {}",
                signal.sample_rate
            )));
        }
        if signal.window_size == 0 || signal.hop_size == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "window_size and hop_size must be >= 1, got {} and {}",
                signal.window_size, signal.hop_size
            )));
        }
        if self.ensemble.sequence_length == 0 {
            return Err(PipelineError::InvalidConfig(
                "sequence_length must be >= 1".to_string(),
            ));
        }
        self.ensemble.weights()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::FmtSubscriber;

    /// In-memory log sink
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = FmtSubscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.signal.window_size, 1024);
        assert_eq!(config.signal.hop_size, 512);
        assert_eq!(config.ensemble.weights().unwrap(), FusionWeights::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[signal]\nhop_size = 256\n\n[ensemble]\nautoencoder_weight = 0.5\nisolation_forest_weight = 0.5\nsequence_weight = 0.0\n\n[logging]\njson = true"
        )
        .unwrap();

        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.signal.hop_size, 256);
        assert_eq!(config.signal.window_size, 1024);
        assert_eq!(config.ensemble.sequence_weight, 0.0);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_bad_weights_rejected_on_load() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[ensemble]\nautoencoder_weight = 0.5").unwrap();
        assert!(matches!(
            PipelineConfig::load(Some(file.path())),
            Err(PipelineError::Ensemble(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            PipelineConfig::load(Some(&missing)),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_summary_logged_only_on_request() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[signal]\nhop_size = 256").unwrap();

        let mut loaded = None;
        let during_load = capture_logs(|| loaded = Some(PipelineConfig::load(Some(file.path()))));
        assert!(!during_load.contains("Configuration loaded"));

        let config = loaded.unwrap().unwrap();
        let summary = capture_logs(|| config.log_summary());
        assert!(summary.contains("Configuration loaded"));
        assert!(summary.contains("hop=256"));
    }

    #[test]
    fn test_validation() {
        let mut config = PipelineConfig::default();
        config.signal.hop_size = 0;
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut config = PipelineConfig::default();
        config.signal.sample_rate = -1.0;
        assert!(config.validate().is_err());
    }
}
