use thiserror::Error;

use crate::consts::{CUSTOM_RATIO_MESSAGE, SIZE_RANGE_MESSAGE};

#[derive(Error, Debug)]
pub enum SizerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("{}", SIZE_RANGE_MESSAGE)]
    InvalidSizeRange { min_mb: f64, max_mb: f64 },

    #[error("{}", CUSTOM_RATIO_MESSAGE)]
    InvalidCustomRatio,

    #[error("No file selected")]
    NoFileSelected,

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("Network error: {0}")]
    Transport(String),
}

impl SizerError {
    /// True for errors raised before any request leaves the client.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidSizeRange { .. } | Self::InvalidCustomRatio
        )
    }
}

pub type Result<T> = std::result::Result<T, SizerError>;
