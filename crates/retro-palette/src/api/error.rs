//! Unified error type for the retro-palette public API.

use std::fmt;

use crate::image::ImageError;
use crate::palette::{PaletteError, ParseColorError};
use crate::preprocess::ResizeError;

/// Unified error type for the retro-palette public API.
///
/// Wraps every error type of the crate into a single enum for convenient
/// `?` propagation in application code.
///
/// # Example
///
/// ```
/// use retro_palette::{PixelError, Palette};
///
/// fn two_tone() -> Result<Palette, PixelError> {
///     let palette = Palette::from_hex("duo", &["#000000", "#FFFFFF"])?;
///     Ok(palette)
/// }
/// # assert!(two_tone().is_ok());
/// ```
#[derive(Debug)]
pub enum PixelError {
    /// Palette construction or lookup failed
    Palette(PaletteError),
    /// Invalid pixel buffer
    Image(ImageError),
    /// Invalid resize target
    Resize(ResizeError),
}

impl fmt::Display for PixelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelError::Palette(err) => write!(f, "palette error: {}", err),
            PixelError::Image(err) => write!(f, "image error: {}", err),
            PixelError::Resize(err) => write!(f, "resize error: {}", err),
        }
    }
}

impl std::error::Error for PixelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PixelError::Palette(err) => Some(err),
            PixelError::Image(err) => Some(err),
            PixelError::Resize(err) => Some(err),
        }
    }
}

impl From<PaletteError> for PixelError {
    fn from(err: PaletteError) -> Self {
        PixelError::Palette(err)
    }
}

/// Color parse failures surface as palette errors.
impl From<ParseColorError> for PixelError {
    fn from(err: ParseColorError) -> Self {
        PixelError::Palette(PaletteError::ParseColor(err))
    }
}

impl From<ImageError> for PixelError {
    fn from(err: ImageError) -> Self {
        PixelError::Image(err)
    }
}

impl From<ResizeError> for PixelError {
    fn from(err: ResizeError) -> Self {
        PixelError::Resize(err)
    }
}
