use crate::config::DETECTION_INPUT_SIZE;
use crate::{PixelBuffer, Preprocess, PreprocessError};
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};

/// Decodes an encoded image and squashes it to a fixed square.
///
/// Aspect ratio is not preserved: every input is stretched to
/// `input_size x input_size`. The resize destination is reused across calls.
pub struct ImagePreprocessor {
    input_size: u32,
    resizer: Resizer,
    resized: Image<'static>,
}

impl ImagePreprocessor {
    pub fn new(input_size: u32) -> Result<Self, PreprocessError> {
        if input_size == 0 {
            return Err(PreprocessError::InvalidTargetSize(input_size));
        }

        Ok(Self {
            input_size,
            resizer: Resizer::new(),
            resized: Image::new(input_size, input_size, PixelType::U8x4),
        })
    }

    fn decode_rgba(encoded: &[u8]) -> Result<image::RgbaImage, PreprocessError> {
        let _s = span!("decode_image");

        let decoded = image::load_from_memory(encoded)?;
        Ok(decoded.to_rgba8())
    }

    fn resize_rgba(&mut self, rgba: &image::RgbaImage) -> Result<&[u8], PreprocessError> {
        let _s = span!("resize_square");

        let (width, height) = rgba.dimensions();
        let src = ImageRef::new(width, height, rgba.as_raw(), PixelType::U8x4)?;

        self.resizer.resize(
            &src,
            &mut self.resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        Ok(self.resized.buffer())
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self {
            input_size: DETECTION_INPUT_SIZE,
            resizer: Resizer::new(),
            resized: Image::new(DETECTION_INPUT_SIZE, DETECTION_INPUT_SIZE, PixelType::U8x4),
        }
    }
}

impl Preprocess for ImagePreprocessor {
    fn preprocess(&mut self, image: &[u8]) -> Result<PixelBuffer, PreprocessError> {
        let _s = span!("preprocess_image");

        let rgba = Self::decode_rgba(image)?;

        tracing::trace!(
            width = rgba.width(),
            height = rgba.height(),
            encoded_bytes = image.len(),
            target = self.input_size,
            "Decoded input image"
        );

        let resized = self.resize_rgba(&rgba)?;
        Ok(PixelBuffer::from_rgba(resized))
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }
}

/// One-shot decode + square resize + alpha strip.
pub fn resize(image: &[u8], target_size: u32) -> Result<PixelBuffer, PreprocessError> {
    ImagePreprocessor::new(target_size)?.preprocess(image)
}
