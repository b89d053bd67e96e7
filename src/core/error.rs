//! Error types for terrain generation and editing

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Raster of {width}x{height} cannot hold {len} samples")]
    RasterSize { width: u32, height: u32, len: usize },

    #[error("Raster dimensions {actual:?} do not match {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("No height field has been set on the landscape")]
    MissingHeightField,

    #[error("Invalid grid stride ({0}, {1})")]
    InvalidStride(u32, u32),
}
