//! Sequence Assembly for the Temporal Detector
//!
//! Stacks consecutive feature rows into overlapping `(seq_len, features)`
//! blocks. A labeled sequence takes the label of its last timestep.

use crate::FeatureError;
use ndarray::{s, Array3, ArrayView2, Axis};

/// Number of sequences produced from `n_rows` rows
pub fn sequence_count(n_rows: usize, seq_len: usize, stride: usize) -> usize {
    if seq_len == 0 || stride == 0 || n_rows < seq_len {
        return 0;
    }
    (n_rows - seq_len) / stride + 1
}

/// Build overlapping sequences of shape `(n_sequences, seq_len, n_features)`
pub fn build_sequences(
    features: ArrayView2<'_, f64>,
    seq_len: usize,
    stride: usize,
) -> Result<Array3<f64>, FeatureError> {
    if seq_len == 0 || stride == 0 {
        return Err(FeatureError::InvalidInput(format!(
            "sequence_length and stride must be >= 1, got sequence_length={}, stride={}",
            seq_len, stride
        )));
    }

    let (n_rows, n_features) = features.dim();
    let n_sequences = sequence_count(n_rows, seq_len, stride);

    let mut sequences = Array3::zeros((n_sequences, seq_len, n_features));
    for (i, mut seq) in sequences.outer_iter_mut().enumerate() {
        let start = i * stride;
        seq.assign(&features.slice(s![start..start + seq_len, ..]));
    }
    Ok(sequences)
}

/// Build sequences together with the label of each sequence's last row
pub fn build_labeled_sequences(
    features: ArrayView2<'_, f64>,
    labels: &[u8],
    seq_len: usize,
    stride: usize,
) -> Result<(Array3<f64>, Vec<u8>), FeatureError> {
    if labels.len() != features.nrows() {
        return Err(FeatureError::InvalidInput(format!(
            "Expected {} labels, got {}",
            features.nrows(),
            labels.len()
        )));
    }

    let sequences = build_sequences(features, seq_len, stride)?;
    let sequence_labels = (0..sequences.len_of(Axis(0)))
        .map(|i| labels[i * stride + seq_len - 1])
        .collect();
    Ok((sequences, sequence_labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn ramp(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * 10 + c) as f64)
    }

    #[test]
    fn test_sequence_shape() {
        let features = ramp(10, 3);
        let sequences = build_sequences(features.view(), 4, 2).unwrap();
        // (10 - 4) / 2 + 1 = 4
        assert_eq!(sequences.dim(), (4, 4, 3));
        assert_eq!(sequences[[1, 0, 0]], 20.0);
        assert_eq!(sequences[[3, 3, 2]], 92.0);
    }

    #[test]
    fn test_too_few_rows() {
        let features = ramp(3, 2);
        let sequences = build_sequences(features.view(), 5, 1).unwrap();
        assert_eq!(sequences.dim(), (0, 5, 2));
    }

    #[test]
    fn test_labels_from_last_timestep() {
        let features = ramp(6, 2);
        let labels = [0, 0, 0, 1, 0, 1];
        let (sequences, seq_labels) =
            build_labeled_sequences(features.view(), &labels, 3, 1).unwrap();
        assert_eq!(sequences.dim().0, 4);
        assert_eq!(seq_labels, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_invalid_parameters() {
        let features = ramp(6, 2);
        assert!(build_sequences(features.view(), 0, 1).is_err());
        assert!(build_sequences(features.view(), 2, 0).is_err());
        assert!(build_labeled_sequences(features.view(), &[0, 1], 2, 1).is_err());
    }
}
