//! Error type for image construction.

use std::fmt;

/// Error type for building an [`Image`](super::Image) from raw pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Width or height is zero
    ZeroDimension {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
    /// Buffer length does not match `width * height * channels`
    BufferSize {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::ZeroDimension { width, height } => {
                write!(f, "image dimensions must be non-zero (got {}x{})", width, height)
            }
            ImageError::BufferSize { expected, actual } => {
                write!(
                    f,
                    "pixel buffer has {} bytes, expected {}",
                    actual, expected
                )
            }
        }
    }
}

impl std::error::Error for ImageError {}
