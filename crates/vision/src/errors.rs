use preprocess::PreprocessError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Model unavailable at {path}: {source}")]
    ModelUnavailable {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] PreprocessError),

    #[error("Shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Inference engine error: {0}")]
    Engine(#[from] anyhow::Error),
}

impl InferenceError {
    pub fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        InferenceError::ShapeMismatch {
            what,
            expected,
            actual,
        }
    }
}
