//! IndexedImage: palette indices plus the palette they refer to.

use std::collections::BTreeSet;

use crate::image::{Image, PixelFormat};
use crate::palette::Palette;

/// A quantized image stored as one palette index per pixel.
///
/// This is the form produced by [`quantize_indexed`](crate::quantize::quantize_indexed)
/// and the natural input for indexed PNG encoding. [`to_image`](Self::to_image)
/// renders it back to RGB.
///
/// # Example
///
/// ```
/// use retro_palette::{IndexedImage, Palette, Rgb};
///
/// let palette = Palette::new("bw", vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]).unwrap();
/// let image = IndexedImage::new(vec![0, 1, 1, 0], 2, 2, palette);
///
/// assert_eq!(image.indices(), &[0, 1, 1, 0]);
/// assert_eq!(image.to_image().pixel(1, 0), Rgb::new(255, 255, 255));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    indices: Vec<u8>,
    width: u32,
    height: u32,
    palette: Palette,
}

impl IndexedImage {
    /// Wrap palette indices in row-major order.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `indices.len() == width * height` and that every
    /// index is in range for `palette`.
    pub fn new(indices: Vec<u8>, width: u32, height: u32, palette: Palette) -> Self {
        debug_assert_eq!(
            indices.len(),
            width as usize * height as usize,
            "indices length ({}) must match {}x{}",
            indices.len(),
            width,
            height,
        );
        debug_assert!(
            indices.iter().all(|&i| (i as usize) < palette.len()),
            "palette index out of range"
        );
        Self {
            indices,
            width,
            height,
            palette,
        }
    }

    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Render to an RGB [`Image`] by looking up each index in the palette.
    pub fn to_image(&self) -> Image {
        let colors = self.palette.colors();
        let mut rgb = Vec::with_capacity(self.indices.len() * 3);
        for &idx in &self.indices {
            rgb.extend_from_slice(&colors[idx as usize].to_bytes());
        }
        Image::from_raw_unchecked(self.width, self.height, PixelFormat::Rgb, rgb)
    }

    /// Sorted set of palette indices that occur in the image.
    pub fn used_indices(&self) -> BTreeSet<u8> {
        self.indices.iter().copied().collect()
    }
}
