//! Feature Engineering Engine
//!
//! Turns windows of raw vibration samples into the canonical 30-element
//! feature vector: 10 time-domain statistics, 10 spectral statistics, and
//! 10 wavelet statistics, always in [`FEATURE_NAMES`] order.

mod error;
mod features;
mod fft;
mod schema;
mod sequence;
mod statistics;
mod wavelet;

pub use error::FeatureError;
pub use features::{FeatureExtractor, FeatureMatrix, FeatureVector};
pub use fft::{FftAnalyzer, FrequencyBands, SpectralFeatures};
pub use schema::{
    feature_index, FEATURE_NAMES, FEATURE_SCHEMA_VERSION, FREQUENCY_BLOCK, NUM_FEATURES,
    TIME_BLOCK, WAVELET_BLOCK,
};
pub use sequence::{build_labeled_sequences, build_sequences, sequence_count};
pub use statistics::TimeDomainFeatures;
pub use wavelet::{DwtAnalyzer, DwtCoefficients, WaveletFeatures, WaveletFilter};

/// Guard added to denominators so silent or constant windows stay finite
pub const EPSILON: f64 = 1e-12;
