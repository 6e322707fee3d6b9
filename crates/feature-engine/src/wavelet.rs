//! Wavelet-Domain Features
//!
//! Multi-level discrete wavelet transform with the 8-tap Daubechies filter
//! (four vanishing moments) and half-sample symmetric boundary extension.
//! Each level convolves, keeps every second output, and yields
//! `floor((n + 7) / 2)` approximation and detail coefficients.

use crate::EPSILON;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Decomposition levels used for feature extraction
pub const DEFAULT_LEVELS: usize = 4;

/// Daubechies-4 decomposition filter bank
#[derive(Debug, Clone, PartialEq)]
pub struct WaveletFilter {
    /// Lowpass decomposition filter
    pub lo_d: [f64; 8],
    /// Highpass decomposition filter
    pub hi_d: [f64; 8],
}

impl WaveletFilter {
    /// Daubechies wavelet with four vanishing moments
    pub fn db4() -> Self {
        let lo_d = [
            -0.010_597_401_785_069_032,
            0.032_883_011_666_885_2,
            0.030_841_381_835_560_764,
            -0.187_034_811_719_093_09,
            -0.027_983_769_416_859_854,
            0.630_880_767_929_858_9,
            0.714_846_570_552_915_7,
            0.230_377_813_308_896_5,
        ];

        // QMF relation: hi_d[k] = (-1)^(k+1) * lo_d[N-1-k]
        let n = lo_d.len();
        let mut hi_d = [0.0; 8];
        for (k, h) in hi_d.iter_mut().enumerate() {
            let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
            *h = sign * lo_d[n - 1 - k];
        }

        Self { lo_d, hi_d }
    }
}

impl Default for WaveletFilter {
    fn default() -> Self {
        Self::db4()
    }
}

/// DWT decomposition coefficients at multiple levels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DwtCoefficients {
    /// Approximation coefficients at the coarsest level
    pub approximation: Vec<f64>,
    /// Detail coefficients, finest (D1) to coarsest
    pub details: Vec<Vec<f64>>,
}

impl DwtCoefficients {
    /// Number of decomposition levels
    pub fn num_levels(&self) -> usize {
        self.details.len()
    }
}

/// Forward wavelet decomposition
#[derive(Debug, Clone)]
pub struct DwtAnalyzer {
    filter: WaveletFilter,
    levels: usize,
}

impl DwtAnalyzer {
    /// Create a db4 analyzer; `levels` is raised to at least 1
    pub fn new(levels: usize) -> Self {
        Self {
            filter: WaveletFilter::db4(),
            levels: levels.max(1),
        }
    }

    /// Number of decomposition levels
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Perform multi-level DWT analysis
    pub fn analyze(&self, signal: &[f64]) -> DwtCoefficients {
        if signal.is_empty() {
            return DwtCoefficients::default();
        }

        let mut approx = signal.to_vec();
        let mut details = Vec::with_capacity(self.levels);

        for _ in 0..self.levels {
            let (a, d) = self.single_level_decompose(&approx);
            details.push(d);
            approx = a;
        }

        DwtCoefficients {
            approximation: approx,
            details,
        }
    }

    /// Single-level DWT: convolve with both filters, keep odd output positions
    fn single_level_decompose(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = input.len();
        let taps = self.filter.lo_d.len();
        let out_len = (n + taps - 1) / 2;

        let mut approx = Vec::with_capacity(out_len);
        let mut detail = Vec::with_capacity(out_len);

        for o in 0..out_len {
            let i = (2 * o + 1) as isize;
            let mut lo_sum = 0.0;
            let mut hi_sum = 0.0;
            for k in 0..taps {
                let x = input[symmetric_index(i - k as isize, n)];
                lo_sum += self.filter.lo_d[k] * x;
                hi_sum += self.filter.hi_d[k] * x;
            }
            approx.push(lo_sum);
            detail.push(hi_sum);
        }

        (approx, detail)
    }
}

impl Default for DwtAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_LEVELS)
    }
}

/// Map an out-of-range index onto a half-sample symmetric extension:
/// `x[-1] = x[0]`, `x[n] = x[n-1]`, repeating with period `2n`.
fn symmetric_index(idx: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = idx.rem_euclid(period) as usize;
    if m < n {
        m
    } else {
        2 * n - 1 - m
    }
}

/// Wavelet features of a single raw (untapered) window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveletFeatures {
    /// Detail-band energies, D1 (finest) to D4
    pub detail_energy: [f64; 4],
    /// Energy of the coarsest approximation band
    pub approx_energy: f64,
    /// Shannon entropy (bits) per detail band, D1 to D4
    pub entropy: [f64; 4],
    /// Population variance of all detail coefficients
    pub variance: f64,
}

impl WaveletFeatures {
    /// Number of values produced
    pub const COUNT: usize = 10;

    /// Compute wavelet features from one window
    pub fn compute(analyzer: &DwtAnalyzer, window: ArrayView1<'_, f64>) -> Self {
        let samples: Vec<f64> = window.iter().copied().collect();
        let coeffs = analyzer.analyze(&samples);
        Self::from_coefficients(&coeffs)
    }

    /// Summarize an existing decomposition (first four detail bands)
    pub fn from_coefficients(coeffs: &DwtCoefficients) -> Self {
        let mut features = Self {
            approx_energy: energy(&coeffs.approximation),
            ..Self::default()
        };

        for (level, band) in coeffs.details.iter().take(4).enumerate() {
            features.detail_energy[level] = energy(band);
            features.entropy[level] = shannon_entropy(band);
        }

        // Coarsest band first: D4, D3, D2, D1
        let all_details: Vec<f64> = coeffs.details.iter().rev().flatten().copied().collect();
        features.variance = population_variance(&all_details);

        features
    }

    /// Values in schema order
    pub fn to_array(&self) -> [f64; Self::COUNT] {
        [
            self.detail_energy[0],
            self.detail_energy[1],
            self.detail_energy[2],
            self.detail_energy[3],
            self.approx_energy,
            self.entropy[0],
            self.entropy[1],
            self.entropy[2],
            self.entropy[3],
            self.variance,
        ]
    }
}

fn energy(band: &[f64]) -> f64 {
    band.iter().map(|c| c * c).sum()
}

/// Entropy of squared coefficients normalized to a distribution; zero terms skipped
fn shannon_entropy(band: &[f64]) -> f64 {
    let total = energy(band) + EPSILON;
    -band
        .iter()
        .map(|c| c * c / total)
        .filter(|&p| p > 0.0)
        .map(|p| p * p.log2())
        .sum::<f64>()
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}
