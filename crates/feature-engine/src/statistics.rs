//! Time-Domain Statistical Features

use crate::EPSILON;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Statistical features of a single raw (untapered) window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeDomainFeatures {
    /// Root mean square
    pub rms: f64,
    /// Largest absolute sample
    pub peak: f64,
    /// peak / rms
    pub crest_factor: f64,
    /// Excess (Fisher) kurtosis
    pub kurtosis: f64,
    /// Skewness (asymmetry)
    pub skewness: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Sum of squares
    pub energy: f64,
    /// Mean absolute value
    pub mean_abs_value: f64,
    /// max - min
    pub peak_to_peak: f64,
    /// peak / mean absolute value
    pub impulse_factor: f64,
}

impl TimeDomainFeatures {
    /// Number of values produced
    pub const COUNT: usize = 10;

    /// Compute time-domain features from one window
    pub fn compute(window: ArrayView1<'_, f64>) -> Self {
        if window.is_empty() {
            return Self::default();
        }

        let n = window.len() as f64;

        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut sum_abs = 0.0;
        let mut peak = 0.0_f64;
        let mut min = f64::MAX;
        let mut max = f64::MIN;

        for &v in window.iter() {
            sum += v;
            sum_sq += v * v;
            sum_abs += v.abs();
            peak = peak.max(v.abs());
            min = min.min(v);
            max = max.max(v);
        }

        let mean = sum / n;

        // Central moments
        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;
        for &v in window.iter() {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        m2 /= n;
        m3 /= n;
        m4 /= n;

        let rms = (sum_sq / n).sqrt();
        let mean_abs_value = sum_abs / n;

        Self {
            rms,
            peak,
            crest_factor: peak / (rms + EPSILON),
            kurtosis: m4 / (m2 * m2 + EPSILON) - 3.0,
            skewness: m3 / (m2.powf(1.5) + EPSILON),
            std_dev: m2.sqrt(),
            energy: sum_sq,
            mean_abs_value,
            peak_to_peak: max - min,
            impulse_factor: peak / (mean_abs_value + EPSILON),
        }
    }

    /// Values in schema order
    pub fn to_array(&self) -> [f64; Self::COUNT] {
        [
            self.rms,
            self.peak,
            self.crest_factor,
            self.kurtosis,
            self.skewness,
            self.std_dev,
            self.energy,
            self.mean_abs_value,
            self.peak_to_peak,
            self.impulse_factor,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, len: usize, sample_rate: f64) -> Array1<f64> {
        Array1::from_shape_fn(len, |i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
    }

    #[test]
    fn test_sine_crest_factor() {
        // 1000 Hz at 20 kHz: exactly 51.2 periods in 1024 samples is close enough
        let window = sine(1000.0, 1024, 20_000.0);
        let stats = TimeDomainFeatures::compute(window.view());
        assert!((stats.crest_factor - 2.0_f64.sqrt()).abs() < 0.01);
        assert!((stats.rms - 1.0 / 2.0_f64.sqrt()).abs() < 0.01);
    }

    #[test]
    fn test_std_dev_is_population() {
        let window = Array1::from(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let stats = TimeDomainFeatures::compute(window.view());
        assert_relative_eq!(stats.std_dev, 2.0, epsilon = 1e-12);
        assert_relative_eq!(stats.energy, 232.0, epsilon = 1e-12);
        assert_relative_eq!(stats.peak_to_peak, 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_window_is_finite() {
        let window = Array1::from_elem(256, 3.5);
        let stats = TimeDomainFeatures::compute(window.view());
        for v in stats.to_array() {
            assert!(v.is_finite());
        }
        assert!(stats.peak >= stats.rms);
        assert!((stats.kurtosis + 3.0).abs() < 1e-6);
        assert!(stats.skewness.abs() < 1e-6);
    }

    #[test]
    fn test_silent_window() {
        let window = Array1::zeros(1024);
        let stats = TimeDomainFeatures::compute(window.view());
        assert_eq!(stats.rms, 0.0);
        assert_eq!(stats.peak, 0.0);
        assert_eq!(stats.crest_factor, 0.0);
        assert_eq!(stats.impulse_factor, 0.0);
    }

    #[test]
    fn test_skewness_sign() {
        let window = Array1::from(vec![0.0, 0.0, 0.0, 0.0, 10.0]);
        let stats = TimeDomainFeatures::compute(window.view());
        assert!(stats.skewness > 0.0);
    }

    #[test]
    fn test_empty_window() {
        let window = Array1::<f64>::zeros(0);
        let stats = TimeDomainFeatures::compute(window.view());
        assert_eq!(stats, TimeDomainFeatures::default());
    }

    proptest! {
        #[test]
        fn peak_dominates_rms(values in proptest::collection::vec(-1e3f64..1e3, 1..512)) {
            let window = Array1::from(values);
            let stats = TimeDomainFeatures::compute(window.view());
            prop_assert!(stats.peak + 1e-9 >= stats.rms);
            for v in stats.to_array() {
                prop_assert!(v.is_finite());
            }
        }
    }
}
