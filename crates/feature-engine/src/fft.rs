//! FFT-based Frequency Analysis

use crate::EPSILON;
use ndarray::ArrayView1;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Half-open frequency band definitions (Hz)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBands {
    /// Band edges, lowest band first
    pub edges: [(f64, f64); 4],
}

impl Default for FrequencyBands {
    fn default() -> Self {
        Self {
            edges: [
                (0.0, 1000.0),
                (1000.0, 2000.0),
                (2000.0, 5000.0),
                (5000.0, 10_000.0),
            ],
        }
    }
}

/// Spectral features of a single tapered window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectralFeatures {
    /// Frequency of the magnitude peak (Hz)
    pub dominant_freq: f64,
    /// Power-weighted mean frequency (Hz)
    pub spectral_centroid: f64,
    /// Lowest frequency holding 85% of cumulative power (Hz)
    pub spectral_rolloff_85: f64,
    /// Power-weighted standard deviation around the centroid (Hz)
    pub spectral_spread: f64,
    /// Power in [0, 1 kHz)
    pub band_power_0_1k: f64,
    /// Power in [1 kHz, 2 kHz)
    pub band_power_1_2k: f64,
    /// Power in [2 kHz, 5 kHz)
    pub band_power_2_5k: f64,
    /// Power in [5 kHz, 10 kHz)
    pub band_power_5_10k: f64,
    /// Power-weighted second moment about the centroid (Hz²)
    pub freq_variance: f64,
    /// Fourth standardized power-weighted moment minus 3
    pub spectral_kurtosis: f64,
}

impl SpectralFeatures {
    /// Number of values produced
    pub const COUNT: usize = 10;

    /// Values in schema order
    pub fn to_array(&self) -> [f64; Self::COUNT] {
        [
            self.dominant_freq,
            self.spectral_centroid,
            self.spectral_rolloff_85,
            self.spectral_spread,
            self.band_power_0_1k,
            self.band_power_1_2k,
            self.band_power_2_5k,
            self.band_power_5_10k,
            self.freq_variance,
            self.spectral_kurtosis,
        ]
    }
}

/// FFT analyzer for frequency-domain features
#[derive(Debug, Clone)]
pub struct FftAnalyzer {
    /// Frequency bands to analyze
    bands: FrequencyBands,
    /// Sampling frequency (Hz)
    sample_rate: f64,
}

impl FftAnalyzer {
    /// Create a new FFT analyzer with the standard bearing bands
    pub fn new(sample_rate: f64) -> Self {
        Self {
            bands: FrequencyBands::default(),
            sample_rate,
        }
    }

    /// Create an analyzer with custom band edges
    pub fn with_bands(sample_rate: f64, bands: FrequencyBands) -> Self {
        Self { bands, sample_rate }
    }

    /// Sampling frequency (Hz)
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Plan a forward transform for windows of `len` samples.
    ///
    /// Plans are immutable and thread-safe, so one plan serves a whole batch.
    pub fn plan(&self, len: usize) -> Arc<dyn Fft<f64>> {
        FftPlanner::new().plan_fft_forward(len)
    }

    /// Compute spectral features, planning a transform for this window only
    pub fn analyze(&self, window: ArrayView1<'_, f64>) -> SpectralFeatures {
        let fft = self.plan(window.len());
        self.analyze_with(fft.as_ref(), window)
    }

    /// Compute spectral features using a pre-planned transform
    pub fn analyze_with(&self, fft: &dyn Fft<f64>, window: ArrayView1<'_, f64>) -> SpectralFeatures {
        let n = window.len();
        // Strictly positive bins: 1..=(n-1)/2; DC and the mirrored half are excluded
        let positive_bins = n.saturating_sub(1) / 2;
        if positive_bins == 0 {
            return SpectralFeatures::default();
        }
        if fft.len() != n {
            return self.analyze(window);
        }

        let mut buffer: Vec<Complex<f64>> =
            window.iter().map(|&v| Complex::new(v, 0.0)).collect();
        fft.process(&mut buffer);

        let freq_resolution = self.sample_rate / n as f64;
        let freqs: Vec<f64> = (1..=positive_bins)
            .map(|k| k as f64 * freq_resolution)
            .collect();
        let magnitudes: Vec<f64> = buffer[1..=positive_bins].iter().map(|c| c.norm()).collect();
        let power: Vec<f64> = magnitudes.iter().map(|m| m * m).collect();

        // First maximum wins on ties
        let mut dominant_idx = 0;
        let mut max_mag = f64::NEG_INFINITY;
        for (i, &m) in magnitudes.iter().enumerate() {
            if m > max_mag {
                max_mag = m;
                dominant_idx = i;
            }
        }

        let total_power = power.iter().sum::<f64>() + EPSILON;

        let spectral_centroid = freqs
            .iter()
            .zip(&power)
            .map(|(f, p)| f * p)
            .sum::<f64>()
            / total_power;

        // Rolloff: first bin whose cumulative power reaches 85% of the total
        let mut cumulative = Vec::with_capacity(power.len());
        let mut running = 0.0;
        for &p in &power {
            running += p;
            cumulative.push(running);
        }
        let target = 0.85 * running;
        let rolloff_idx = cumulative
            .iter()
            .position(|&c| c >= target)
            .unwrap_or(positive_bins - 1)
            .min(positive_bins - 1);

        let freq_variance = freqs
            .iter()
            .zip(&power)
            .map(|(f, p)| p * (f - spectral_centroid).powi(2))
            .sum::<f64>()
            / total_power;
        let spectral_spread = freq_variance.sqrt();

        let mut band_powers = [0.0; 4];
        for (f, p) in freqs.iter().zip(&power) {
            for (band, &(lo, hi)) in band_powers.iter_mut().zip(self.bands.edges.iter()) {
                if *f >= lo && *f < hi {
                    *band += p;
                }
            }
        }

        let spectral_kurtosis = if spectral_spread > EPSILON {
            freqs
                .iter()
                .zip(&power)
                .map(|(f, p)| p * ((f - spectral_centroid) / spectral_spread).powi(4))
                .sum::<f64>()
                / total_power
                - 3.0
        } else {
            0.0
        };

        SpectralFeatures {
            dominant_freq: freqs[dominant_idx],
            spectral_centroid,
            spectral_rolloff_85: freqs[rolloff_idx],
            spectral_spread,
            band_power_0_1k: band_powers[0],
            band_power_1_2k: band_powers[1],
            band_power_2_5k: band_powers[2],
            band_power_5_10k: band_powers[3],
            freq_variance,
            spectral_kurtosis,
        }
    }
}
