use thiserror::Error;
use toolverse_core::PdfToolError;

#[derive(Error, Debug)]
pub enum ImageToolError {
    #[error("Unsupported target format: {0}")]
    UnsupportedTarget(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("No images added")]
    NoImages,

    #[error("Image index {index} out of bounds ({len} images)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error(transparent)]
    Pdf(#[from] PdfToolError),
}

impl From<lopdf::Error> for ImageToolError {
    fn from(err: lopdf::Error) -> Self {
        ImageToolError::Pdf(PdfToolError::from(err))
    }
}
