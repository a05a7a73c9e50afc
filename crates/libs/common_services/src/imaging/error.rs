use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("No image provided")]
    Missing,

    #[error("Image is not valid base64")]
    InvalidBase64,

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image conversion failed: {0}")]
    Decode(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),
}
