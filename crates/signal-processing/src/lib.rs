//! Signal Processing Primitives
//!
//! Validation, sanitization, and overlapping windowing of raw 1-D vibration
//! signals, plus the Hann taper applied ahead of spectral analysis.

mod error;
mod taper;
mod window;

pub use error::SignalError;
pub use taper::{apply_hann_window, apply_hann_window_dyn, hann_window};
pub use window::{sanitize_signal, window_count, window_signal, window_signal_dyn, WindowBatch};

/// Nominal sampling rate of the accelerometer feed (Hz)
pub const SAMPLE_RATE: f64 = 20_000.0;

/// Samples per window (~51 ms at 20 kHz)
pub const DEFAULT_WINDOW_SIZE: usize = 1024;

/// Samples between successive window starts (50% overlap)
pub const DEFAULT_HOP_SIZE: usize = 512;
