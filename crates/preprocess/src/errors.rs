use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Invalid image buffer: {0}")]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Resize failed: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("Target size must be positive, got {0}")]
    InvalidTargetSize(u32),

    #[error("Pixel buffer length {0} is not a multiple of 3")]
    NotRgb(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = PreprocessError::InvalidTargetSize(0);
        assert_eq!(err.to_string(), "Target size must be positive, got 0");

        let err = PreprocessError::NotRgb(7);
        assert_eq!(err.to_string(), "Pixel buffer length 7 is not a multiple of 3");
    }

    #[test]
    fn test_error_conversion_from_image_error() {
        fn decode(bytes: &[u8]) -> Result<(), PreprocessError> {
            image::load_from_memory(bytes)?;
            Ok(())
        }

        match decode(b"definitely not an image") {
            Err(PreprocessError::ImageDecode(e)) => {
                assert!(!e.to_string().is_empty());
            }
            other => panic!("Expected ImageDecode variant, got {:?}", other),
        }
    }
}
