use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanegapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("Row distance must be a positive finite number, got {0}")]
    InvalidDistance(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Processing cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, CanegapError>;
