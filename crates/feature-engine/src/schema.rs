//! Canonical Feature Schema
//!
//! Column order is a versioned contract: trained detectors and persisted
//! normalizer state are keyed to it. Any reordering or renaming must bump
//! [`FEATURE_SCHEMA_VERSION`].

use std::ops::Range;

/// Version of the name-to-index mapping below
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Number of features per window
pub const NUM_FEATURES: usize = 30;

/// Columns produced by the time-domain family
pub const TIME_BLOCK: Range<usize> = 0..10;

/// Columns produced by the frequency-domain family
pub const FREQUENCY_BLOCK: Range<usize> = 10..20;

/// Columns produced by the wavelet-domain family
pub const WAVELET_BLOCK: Range<usize> = 20..30;

/// Feature names in column order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    // Time domain
    "rms",
    "peak",
    "crest_factor",
    "kurtosis",
    "skewness",
    "std_dev",
    "energy",
    "mean_abs_value",
    "peak_to_peak",
    "impulse_factor",
    // Frequency domain
    "dominant_freq",
    "spectral_centroid",
    "spectral_rolloff_85",
    "spectral_spread",
    "band_power_0_1k",
    "band_power_1_2k",
    "band_power_2_5k",
    "band_power_5_10k",
    "freq_variance",
    "spectral_kurtosis",
    // Wavelet domain
    "wavelet_detail_energy_1",
    "wavelet_detail_energy_2",
    "wavelet_detail_energy_3",
    "wavelet_detail_energy_4",
    "wavelet_approx_energy_4",
    "wavelet_entropy_1",
    "wavelet_entropy_2",
    "wavelet_entropy_3",
    "wavelet_entropy_4",
    "wavelet_variance",
];

/// Column index of a named feature
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|&n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let unique: HashSet<_> = FEATURE_NAMES.iter().collect();
        assert_eq!(unique.len(), NUM_FEATURES);
    }

    #[test]
    fn test_blocks_cover_all_columns() {
        assert_eq!(TIME_BLOCK.len() + FREQUENCY_BLOCK.len() + WAVELET_BLOCK.len(), NUM_FEATURES);
        assert_eq!(TIME_BLOCK.end, FREQUENCY_BLOCK.start);
        assert_eq!(FREQUENCY_BLOCK.end, WAVELET_BLOCK.start);
    }

    #[test]
    fn test_feature_index_lookup() {
        assert_eq!(feature_index("rms"), Some(0));
        assert_eq!(feature_index("dominant_freq"), Some(10));
        assert_eq!(feature_index("wavelet_variance"), Some(29));
        assert_eq!(feature_index("unknown"), None);
    }
}
