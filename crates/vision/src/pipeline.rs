use crate::{
    backend::{InferenceBackend, square_rgb_shape},
    errors::InferenceError,
    processing::{ClassificationDecoder, DetectionDecoder, DetectorConfig},
    types::DetectionResult,
};
use common::span;
use preprocess::{ImagePreprocessor, PixelBuffer, Preprocess, PreprocessError};

fn load_backend<B: InferenceBackend>(path: &str, input_size: u32) -> Result<B, InferenceError> {
    B::load_model(path, &square_rgb_shape(input_size)).map_err(|source| {
        InferenceError::ModelUnavailable {
            path: path.to_string(),
            source,
        }
    })
}

fn square_preprocessor(input_size: u32) -> Result<ImagePreprocessor, InferenceError> {
    ImagePreprocessor::new(input_size).map_err(|e| match e {
        PreprocessError::InvalidTargetSize(size) => {
            InferenceError::InvalidConfig(format!("input size must be positive, got {}", size))
        }
        other => InferenceError::ImageDecode(other),
    })
}

/// Image classifier: preprocess -> infer -> pass-through scores.
///
/// The engine is optional. Without one every call yields the NaN sentinel
/// instead of an error.
pub struct Classifier<B: InferenceBackend> {
    backend: Option<B>,
    preprocessor: ImagePreprocessor,
    decoder: ClassificationDecoder,
}

impl<B: InferenceBackend> Classifier<B> {
    pub fn new(
        backend: Option<B>,
        input_size: u32,
        num_scores: usize,
    ) -> Result<Self, InferenceError> {
        Ok(Self {
            backend,
            preprocessor: square_preprocessor(input_size)?,
            decoder: ClassificationDecoder::new(num_scores),
        })
    }

    pub fn from_model_path(
        path: &str,
        input_size: u32,
        num_scores: usize,
    ) -> Result<Self, InferenceError> {
        let backend = load_backend(path, input_size)?;
        Self::new(Some(backend), input_size, num_scores)
    }

    /// Like `from_model_path`, but a model that fails to load leaves the
    /// classifier unloaded instead of failing.
    pub fn from_model_path_or_unloaded(
        path: &str,
        input_size: u32,
        num_scores: usize,
    ) -> Result<Self, InferenceError> {
        let backend = match load_backend(path, input_size) {
            Ok(backend) => Some(backend),
            Err(e) => {
                tracing::warn!(error = %e, "Classifier model unavailable, scores will be NaN");
                None
            }
        };
        Self::new(backend, input_size, num_scores)
    }

    pub fn is_loaded(&self) -> bool {
        self.backend.is_some()
    }

    /// Classify an already preprocessed buffer.
    pub fn classify(&mut self, pixels: &PixelBuffer) -> Result<Vec<f32>, InferenceError> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(self.decoder.unavailable());
        };

        let output = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            backend.infer(pixels.as_slice())?
        };

        Ok(self.decoder.decode(&output))
    }

    /// Decode, resize and classify an encoded image.
    pub fn classify_image(&mut self, image: &[u8]) -> Result<Vec<f32>, InferenceError> {
        let _s = span!("classify_image");

        if self.backend.is_none() {
            return Ok(self.decoder.unavailable());
        }

        let pixels = self.preprocessor.preprocess(image)?;
        self.classify(&pixels)
    }
}

/// Grid detector: preprocess -> infer -> decode boxes.
pub struct Detector<B: InferenceBackend> {
    backend: B,
    preprocessor: ImagePreprocessor,
    decoder: DetectionDecoder,
}

impl<B: InferenceBackend> Detector<B> {
    pub fn new(backend: B, input_size: u32, config: DetectorConfig) -> Result<Self, InferenceError> {
        Ok(Self {
            backend,
            preprocessor: square_preprocessor(input_size)?,
            decoder: DetectionDecoder::new(config)?,
        })
    }

    pub fn from_model_path(
        path: &str,
        input_size: u32,
        config: DetectorConfig,
    ) -> Result<Self, InferenceError> {
        let preprocessor = square_preprocessor(input_size)?;
        let decoder = DetectionDecoder::new(config)?;
        let backend = load_backend(path, input_size)?;
        Ok(Self {
            backend,
            preprocessor,
            decoder,
        })
    }

    /// Run detection on an already preprocessed buffer.
    pub fn detect_pixels(&mut self, pixels: &PixelBuffer) -> Result<DetectionResult, InferenceError> {
        let output = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            self.backend.infer(pixels.as_slice())?
        };

        let result = self.decoder.decode(&output)?;

        tracing::debug!(detections = result.len(), "Image processed");
        Ok(result)
    }

    /// Decode, resize and run detection on an encoded image.
    pub fn detect(&mut self, image: &[u8]) -> Result<DetectionResult, InferenceError> {
        let _s = span!("detect_image");

        let pixels = self.preprocessor.preprocess(image)?;
        self.detect_pixels(&pixels)
    }
}
