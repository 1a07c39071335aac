use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Sample buffer holds {actual} bytes, expected {expected}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BeamError>;
