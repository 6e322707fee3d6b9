//! Feature Vector Assembly

use crate::fft::{FftAnalyzer, SpectralFeatures};
use crate::schema::{feature_index, NUM_FEATURES};
use crate::statistics::TimeDomainFeatures;
use crate::wavelet::{DwtAnalyzer, WaveletFeatures};
use crate::FeatureError;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewD, Ix2};
use rayon::prelude::*;
use rustfft::Fft;
use serde::{Deserialize, Serialize};
use signal_processing::{apply_hann_window, SAMPLE_RATE};
use tracing::debug;

/// Feature matrix: one row per window, [`NUM_FEATURES`] columns
pub type FeatureMatrix = Array2<f64>;

/// Features of a single window, grouped by family
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Columns 0..10
    pub time: TimeDomainFeatures,
    /// Columns 10..20
    pub frequency: SpectralFeatures,
    /// Columns 20..30
    pub wavelet: WaveletFeatures,
}

impl FeatureVector {
    /// Flatten into schema order
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        let mut values = [0.0; NUM_FEATURES];
        values[..10].copy_from_slice(&self.time.to_array());
        values[10..20].copy_from_slice(&self.frequency.to_array());
        values[20..].copy_from_slice(&self.wavelet.to_array());
        values
    }

    /// Look up a feature by its schema name
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|idx| self.to_array()[idx])
    }
}

/// Feature extractor that processes batches of windows
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// FFT analyzer
    fft_analyzer: FftAnalyzer,
    /// Wavelet decomposition
    dwt_analyzer: DwtAnalyzer,
}

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new(sample_rate: f64) -> Self {
        Self {
            fft_analyzer: FftAnalyzer::new(sample_rate),
            dwt_analyzer: DwtAnalyzer::default(),
        }
    }

    /// Sampling frequency (Hz)
    pub fn sample_rate(&self) -> f64 {
        self.fft_analyzer.sample_rate()
    }

    /// Extract features from an `(N, W)` window batch into an `(N, 30)` matrix.
    ///
    /// The Hann-tapered copy is built once for the whole batch and only feeds
    /// the frequency family; time and wavelet families see the raw rows.
    pub fn extract(&self, windows: ArrayView2<'_, f64>) -> FeatureMatrix {
        let (n_windows, window_size) = windows.dim();
        if n_windows == 0 {
            return Array2::zeros((0, NUM_FEATURES));
        }

        debug!("Extracting features: windows={}, window_size={}", n_windows, window_size);

        let tapered = apply_hann_window(windows);
        let fft = self.fft_analyzer.plan(window_size);

        let vectors: Vec<FeatureVector> = (0..n_windows)
            .into_par_iter()
            .map(|i| self.extract_window(windows.row(i), tapered.row(i), fft.as_ref()))
            .collect();

        let mut features = Array2::zeros((n_windows, NUM_FEATURES));
        for (mut row, vector) in features.rows_mut().into_iter().zip(&vectors) {
            row.assign(&ArrayView1::from(&vector.to_array()[..]));
        }
        features
    }

    /// Extract features from an array of arbitrary dimensionality, rejecting anything but 2-D
    pub fn extract_dyn(&self, windows: ArrayViewD<'_, f64>) -> Result<FeatureMatrix, FeatureError> {
        let ndim = windows.ndim();
        let windows = windows.into_dimensionality::<Ix2>().map_err(|_| {
            FeatureError::InvalidInput(format!("Expected 2-D windows array, got ndim={}", ndim))
        })?;
        Ok(self.extract(windows))
    }

    /// Compute all three feature families for one window
    pub fn extract_window(
        &self,
        raw: ArrayView1<'_, f64>,
        tapered: ArrayView1<'_, f64>,
        fft: &dyn Fft<f64>,
    ) -> FeatureVector {
        FeatureVector {
            time: TimeDomainFeatures::compute(raw),
            frequency: self.fft_analyzer.analyze_with(fft, tapered),
            wavelet: WaveletFeatures::compute(&self.dwt_analyzer, raw),
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, ArrayD, IxDyn};
    use signal_processing::{window_signal, DEFAULT_HOP_SIZE, DEFAULT_WINDOW_SIZE};
    use std::f64::consts::PI;

    fn noisy_windows(rows: usize, cols: usize) -> Array2<f64> {
        // Deterministic pseudo-noise
        let mut state: u64 = 7;
        Array2::from_shape_fn((rows, cols), |_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
        })
    }

    #[test]
    fn test_feature_extraction_shape() {
        let extractor = FeatureExtractor::default();
        let windows = noisy_windows(5, 1024);
        let features = extractor.extract(windows.view());
        assert_eq!(features.dim(), (5, NUM_FEATURES));
        assert!(features.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_batch() {
        let extractor = FeatureExtractor::default();
        let windows = Array2::<f64>::zeros((0, 1024));
        assert_eq!(extractor.extract(windows.view()).dim(), (0, NUM_FEATURES));
    }

    #[test]
    fn test_rejects_non_2d() {
        let extractor = FeatureExtractor::default();
        let flat = ArrayD::<f64>::zeros(IxDyn(&[1024]));
        assert!(matches!(
            extractor.extract_dyn(flat.view()),
            Err(FeatureError::InvalidInput(_))
        ));
        let cube = ArrayD::<f64>::zeros(IxDyn(&[2, 4, 1024]));
        assert!(extractor.extract_dyn(cube.view()).is_err());
    }

    #[test]
    fn test_rows_match_single_window_extraction() {
        let extractor = FeatureExtractor::default();
        let windows = noisy_windows(3, 512);
        let features = extractor.extract(windows.view());

        let tapered = apply_hann_window(windows.view());
        let fft = extractor.fft_analyzer.plan(512);
        let second = extractor.extract_window(windows.row(1), tapered.row(1), fft.as_ref());
        assert_eq!(features.row(1).to_vec(), second.to_array().to_vec());
    }

    #[test]
    fn test_input_not_mutated() {
        let extractor = FeatureExtractor::default();
        let windows = noisy_windows(2, 256);
        let before = windows.clone();
        let _ = extractor.extract(windows.view());
        assert_eq!(windows, before);
    }

    #[test]
    fn test_sine_signal_features() {
        let extractor = FeatureExtractor::default();
        let signal: Vec<f64> = (0..4096)
            .map(|i| (2.0 * PI * 440.0 * i as f64 / SAMPLE_RATE).sin())
            .collect();
        let windows = window_signal(&signal, DEFAULT_WINDOW_SIZE, DEFAULT_HOP_SIZE).unwrap();
        let features = extractor.extract(windows.view());

        let bin_width = SAMPLE_RATE / DEFAULT_WINDOW_SIZE as f64;
        let dominant = feature_index("dominant_freq").unwrap();
        let crest = feature_index("crest_factor").unwrap();
        for row in features.rows() {
            assert!((row[dominant] - 440.0).abs() <= bin_width);
            assert!((row[crest] - 2.0_f64.sqrt()).abs() < 0.05);
        }
    }

    #[test]
    fn test_zero_signal_features() {
        let extractor = FeatureExtractor::default();
        let signal = vec![0.0; 20_000];
        let windows = window_signal(&signal, DEFAULT_WINDOW_SIZE, DEFAULT_HOP_SIZE).unwrap();
        let features = extractor.extract(windows.view());

        assert_eq!(features.dim(), (38, NUM_FEATURES));
        let rms = feature_index("rms").unwrap();
        let dominant = feature_index("dominant_freq").unwrap();
        for row in features.rows() {
            assert_eq!(row[rms], 0.0);
            assert!(row[dominant].is_finite());
        }
    }

    #[test]
    fn test_feature_vector_lookup() {
        let extractor = FeatureExtractor::default();
        let raw = Array1::from_elem(64, 1.0);
        let tapered = &raw * &signal_processing::hann_window(64);
        let fft = extractor.fft_analyzer.plan(64);
        let vector = extractor.extract_window(raw.view(), tapered.view(), fft.as_ref());
        assert_eq!(vector.get("rms"), Some(1.0));
        assert_eq!(vector.get("peak_to_peak"), Some(0.0));
        assert_eq!(vector.get("missing"), None);
    }
}
