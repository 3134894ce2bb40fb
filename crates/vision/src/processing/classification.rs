/// Scores produced by the wrapped classification model.
pub const DEFAULT_NUM_SCORES: usize = 10;

/// Pass-through interpretation of a classifier output vector.
#[derive(Debug, Clone)]
pub struct ClassificationDecoder {
    num_scores: usize,
}

impl ClassificationDecoder {
    pub fn new(num_scores: usize) -> Self {
        Self { num_scores }
    }

    /// Sentinel returned when no model is loaded: `num_scores` NaN values.
    pub fn unavailable(&self) -> Vec<f32> {
        vec![f32::NAN; self.num_scores]
    }

    /// Return the engine output verbatim.
    pub fn decode(&self, output: &[f32]) -> Vec<f32> {
        if output.len() != self.num_scores {
            tracing::warn!(
                expected = self.num_scores,
                actual = output.len(),
                "Classifier output length differs from configured score count"
            );
        }
        output.to_vec()
    }
}

impl Default for ClassificationDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_SCORES)
    }
}

/// True for the all-NaN "no model" sentinel
pub fn is_unavailable(scores: &[f32]) -> bool {
    !scores.is_empty() && scores.iter().all(|s| s.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_sentinel() {
        let decoder = ClassificationDecoder::default();
        let scores = decoder.unavailable();

        assert_eq!(scores.len(), 10);
        assert!(scores.iter().all(|s| s.is_nan()));
        assert!(is_unavailable(&scores));
    }

    #[test]
    fn test_decode_is_pass_through() {
        let decoder = ClassificationDecoder::new(3);
        let output = [0.1, 0.7, 0.2];

        assert_eq!(decoder.decode(&output), vec![0.1, 0.7, 0.2]);
        assert!(!is_unavailable(&output));
    }

    #[test]
    fn test_decode_keeps_unexpected_length() {
        let decoder = ClassificationDecoder::new(10);
        let output = vec![0.05f32; 11];

        assert_eq!(decoder.decode(&output).len(), 11);
    }

    #[test]
    fn test_partial_nan_is_not_the_sentinel() {
        assert!(!is_unavailable(&[f32::NAN, 0.3]));
        assert!(!is_unavailable(&[]));
    }
}
