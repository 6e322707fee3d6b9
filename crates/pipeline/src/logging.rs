//! Logging Setup

use crate::{LoggingConfig, PipelineError};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), PipelineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| PipelineError::Logging(format!("invalid level {:?}: {}", config.level, e)))?;

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| PipelineError::Logging(e.to_string()))
}
