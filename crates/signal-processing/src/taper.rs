//! Hann Taper for Spectral Analysis

use crate::{SignalError, WindowBatch};
use ndarray::{Array1, ArrayView2, ArrayViewD, Ix2};
use std::f64::consts::PI;

/// Symmetric Hann envelope of `len` points: zero at both ends, peak at center.
///
/// A single-point window is `[1.0]`.
pub fn hann_window(len: usize) -> Array1<f64> {
    match len {
        0 => Array1::zeros(0),
        1 => Array1::ones(1),
        _ => {
            let denom = (len - 1) as f64;
            Array1::from_shape_fn(len, |n| 0.5 - 0.5 * (2.0 * PI * n as f64 / denom).cos())
        }
    }
}

/// Return a tapered copy of every window; the input batch is left untouched
pub fn apply_hann_window(windows: ArrayView2<'_, f64>) -> WindowBatch {
    let hann = hann_window(windows.ncols());
    &windows * &hann
}

/// Taper an array of arbitrary dimensionality, rejecting anything but 2-D
pub fn apply_hann_window_dyn(windows: ArrayViewD<'_, f64>) -> Result<WindowBatch, SignalError> {
    let ndim = windows.ndim();
    let windows = windows.into_dimensionality::<Ix2>().map_err(|_| {
        SignalError::InvalidInput(format!("Expected 2-D array of windows, got ndim={}", ndim))
    })?;
    Ok(apply_hann_window(windows))
}
