//! Overlapping Windowing

use crate::SignalError;
use ndarray::{Array2, ArrayViewD, Ix1};
use tracing::debug;

/// Batch of fixed-length windows, one window per row: shape `(N, W)`
pub type WindowBatch = Array2<f64>;

/// Number of full windows that fit in a signal of `signal_len` samples
pub fn window_count(signal_len: usize, window_size: usize, hop_size: usize) -> usize {
    if window_size == 0 || hop_size == 0 || signal_len < window_size {
        return 0;
    }
    (signal_len - window_size) / hop_size + 1
}

/// Copy a raw signal, replacing every NaN/±Inf sample with `0.0`.
///
/// The substitution is silent: callers never see which samples were replaced.
pub fn sanitize_signal(signal: &[f64]) -> Result<Vec<f64>, SignalError> {
    if signal.is_empty() {
        return Err(SignalError::InvalidInput("Signal must not be empty".to_string()));
    }

    let mut replaced = 0usize;
    let clean: Vec<f64> = signal
        .iter()
        .map(|&v| {
            if v.is_finite() {
                v
            } else {
                replaced += 1;
                0.0
            }
        })
        .collect();

    if replaced > 0 {
        debug!("Zero-substituted {} non-finite samples of {}", replaced, signal.len());
    }

    Ok(clean)
}

/// Split a 1-D signal into overlapping windows of `window_size` samples,
/// starting a new window every `hop_size` samples.
///
/// A signal shorter than one window yields an empty `(0, window_size)` batch.
pub fn window_signal(
    signal: &[f64],
    window_size: usize,
    hop_size: usize,
) -> Result<WindowBatch, SignalError> {
    let clean = sanitize_signal(signal)?;
    if window_size < 1 || hop_size < 1 {
        return Err(SignalError::InvalidInput(format!(
            "window_size and hop_size must be >= 1, got window_size={}, hop_size={}",
            window_size, hop_size
        )));
    }

    let n_windows = window_count(clean.len(), window_size, hop_size);
    debug!(
        "Windowing {} samples: window={}, hop={}, windows={}",
        clean.len(),
        window_size,
        hop_size,
        n_windows
    );

    Ok(Array2::from_shape_fn((n_windows, window_size), |(i, j)| {
        clean[i * hop_size + j]
    }))
}

/// Window an array of arbitrary dimensionality, rejecting anything but 1-D
pub fn window_signal_dyn(
    signal: ArrayViewD<'_, f64>,
    window_size: usize,
    hop_size: usize,
) -> Result<WindowBatch, SignalError> {
    let shape = signal.shape().to_vec();
    let signal = signal.into_dimensionality::<Ix1>().map_err(|_| {
        SignalError::InvalidInput(format!("Expected 1-D signal, got shape {:?}", shape))
    })?;
    window_signal(&signal.to_vec(), window_size, hop_size)
}
