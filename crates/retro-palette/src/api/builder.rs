//! PixelArtProcessor builder: downscale, then optionally quantize.

use super::error::PixelError;
use crate::image::Image;
use crate::output::IndexedImage;
use crate::palette::{Palette, PaletteError};
use crate::preprocess::downscale;
use crate::quantize::{quantize, quantize_indexed};

/// Post-processing pipeline turning a high-resolution render into pixel art.
///
/// - [`new`](Self::new) takes the target grid size
/// - [`palette`](Self::palette) optionally enables quantization
/// - [`process`](Self::process) takes `&self`, so one processor can be reused
///   for many images
///
/// # Example
///
/// ```
/// use retro_palette::{Image, PixelArtProcessor, Rgb, GAMEBOY};
///
/// let processor = PixelArtProcessor::new(16).palette(Some(GAMEBOY.clone()));
///
/// let render = Image::filled(256, 256, Rgb::new(250, 250, 250)).unwrap();
/// let art = processor.process(&render).unwrap();
///
/// assert_eq!(art.dimensions(), (16, 16));
/// assert_eq!(art.pixel(0, 0), Rgb::new(155, 188, 15));
/// ```
#[derive(Debug, Clone)]
pub struct PixelArtProcessor {
    size: u32,
    palette: Option<Palette>,
}

impl PixelArtProcessor {
    /// Create a processor producing `size x size` images without quantization.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            palette: None,
        }
    }

    /// Set the quantization palette; `None` keeps the downscaled colors.
    #[inline]
    pub fn palette(mut self, palette: Option<Palette>) -> Self {
        self.palette = palette;
        self
    }

    /// Target edge length in pixels.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The quantization palette, if any.
    #[inline]
    pub fn palette_ref(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Downscale `image` and quantize it if a palette is set.
    ///
    /// # Errors
    ///
    /// [`PixelError::Resize`] if the target size is zero or above [`MAX_SIZE`](crate::MAX_SIZE).
    pub fn process(&self, image: &Image) -> Result<Image, PixelError> {
        let small = downscale(image, self.size)?;
        Ok(match &self.palette {
            Some(palette) => quantize(&small, palette),
            None => small,
        })
    }

    /// Downscale `image` and return palette indices.
    ///
    /// # Errors
    ///
    /// - [`PixelError::Resize`] if the target size is zero or above [`MAX_SIZE`](crate::MAX_SIZE)
    /// - [`PixelError::Palette`] with `PaletteError::Missing` if no palette is set
    pub fn process_indexed(&self, image: &Image) -> Result<IndexedImage, PixelError> {
        let palette = self.palette.as_ref().ok_or(PaletteError::Missing)?;
        let small = downscale(image, self.size)?;
        Ok(quantize_indexed(&small, palette))
    }
}
