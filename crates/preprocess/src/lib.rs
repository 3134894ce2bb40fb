pub mod config;
pub mod cpu;
pub mod errors;

pub use config::{CLASSIFICATION_INPUT_SIZE, DETECTION_INPUT_SIZE};
pub use cpu::{ImagePreprocessor, resize};
pub use errors::PreprocessError;

/// Flat RGB samples, row-major and channel-interleaved (`R, G, B, R, G, B, ...`).
///
/// Samples are raw 0-255 intensities stored as `f32`. The length is always a
/// multiple of 3: there is never an alpha sample in the buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelBuffer {
    samples: Vec<f32>,
}

impl PixelBuffer {
    /// Build a buffer from an RGBA8 raster, dropping every 4th byte.
    ///
    /// A trailing partial pixel is ignored.
    pub fn from_rgba(rgba: &[u8]) -> Self {
        let mut samples = Vec::with_capacity(rgba.len() / 4 * 3);
        for px in rgba.chunks_exact(4) {
            samples.push(px[0] as f32);
            samples.push(px[1] as f32);
            samples.push(px[2] as f32);
        }
        Self { samples }
    }

    /// Wrap already interleaved RGB samples.
    pub fn from_rgb_samples(samples: Vec<f32>) -> Result<Self, PreprocessError> {
        if samples.len() % 3 != 0 {
            return Err(PreprocessError::NotRgb(samples.len()));
        }
        Ok(Self { samples })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn pixel_count(&self) -> usize {
        self.samples.len() / 3
    }
}

/// Trait for image preprocessing implementations
pub trait Preprocess {
    /// Decode `image` and turn it into the model's square RGB input.
    fn preprocess(&mut self, image: &[u8]) -> Result<PixelBuffer, PreprocessError>;

    /// Side of the square this preprocessor targets
    fn input_size(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_strips_alpha() {
        let rgba = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let buffer = PixelBuffer::from_rgba(&rgba);

        assert_eq!(buffer.as_slice(), &[1.0, 2.0, 3.0, 5.0, 6.0, 7.0]);
        assert_eq!(buffer.pixel_count(), 2);
    }

    #[test]
    fn test_from_rgba_ignores_partial_pixel() {
        let rgba = [9u8, 9, 9, 255, 1, 2];
        let buffer = PixelBuffer::from_rgba(&rgba);

        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_from_rgb_samples_rejects_non_rgb_length() {
        assert!(PixelBuffer::from_rgb_samples(vec![0.0; 6]).is_ok());
        assert!(matches!(
            PixelBuffer::from_rgb_samples(vec![0.0; 4]),
            Err(PreprocessError::NotRgb(4))
        ));
    }
}
