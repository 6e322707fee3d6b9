//! Vibration Monitoring Pipeline
//!
//! Wires the stages together: raw signal, windows, features, normalized
//! features, detector scores, fused alerts. Also hosts configuration
//! loading and logging setup for the `vibration-monitor` binary.

mod error;
mod logging;
mod monitor;
mod settings;

pub use error::PipelineError;
pub use logging::init_logging;
pub use monitor::{parse_signal, FeatureReport, MonitoringPipeline};
pub use settings::{EnsembleConfig, LoggingConfig, NormalizerConfig, PipelineConfig, SignalConfig};
