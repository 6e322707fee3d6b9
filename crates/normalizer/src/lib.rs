//! Feature Normalization
//!
//! Standardizes feature matrices column by column with statistics fit once
//! on known-normal data. Fitting on data that already contains faults skews
//! the baseline; keeping the fit set clean is the caller's responsibility.

mod error;
mod scaler;
mod state;

pub use error::NormalizationError;
pub use scaler::StandardNormalizer;
pub use state::NormalizationState;

/// Standard deviations below this are treated as zero and get unit scale
pub const MIN_SCALE: f64 = 10.0 * f64::EPSILON;
