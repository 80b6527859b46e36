//! Dense 8-bit pixel buffer.

use std::collections::HashSet;

use super::error::ImageError;
use crate::color::Rgb;

/// Channel layout of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 3 bytes per pixel: R, G, B
    Rgb,
    /// 4 bytes per pixel: R, G, B, A
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// A two-dimensional grid of 8-bit RGB or RGBA pixels in row-major order.
///
/// Alpha, when present, is carried through resizing but never takes part in
/// color matching.
///
/// # Example
///
/// ```
/// use retro_palette::{Image, PixelFormat, Rgb};
///
/// let image = Image::filled(4, 2, Rgb::new(42, 100, 200)).unwrap();
/// assert_eq!(image.dimensions(), (4, 2));
/// assert_eq!(image.format(), PixelFormat::Rgb);
/// assert_eq!(image.pixel(3, 1), Rgb::new(42, 100, 200));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Image {
    /// Wrap a raw pixel buffer.
    ///
    /// # Errors
    ///
    /// - [`ImageError::ZeroDimension`] if width or height is zero
    /// - [`ImageError::BufferSize`] if `data.len() != width * height * channels`
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Construct without validation; the caller guarantees the length.
    pub(crate) fn from_raw_unchecked(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * format.channels());
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Wrap a packed `[R, G, B, ...]` buffer.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        Self::from_raw(width, height, PixelFormat::Rgb, data)
    }

    /// Wrap a packed `[R, G, B, A, ...]` buffer.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        Self::from_raw(width, height, PixelFormat::Rgba, data)
    }

    /// Build an RGB image from one color per pixel.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Rgb]) -> Result<Self, ImageError> {
        let data = pixels.iter().flat_map(|c| c.to_bytes()).collect();
        Self::from_rgb8(width, height, data)
    }

    /// A solid RGB image.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self, ImageError> {
        let count = width as usize * height as usize;
        let data = color.to_bytes().repeat(count);
        Self::from_rgb8(width, height, data)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.format == PixelFormat::Rgba
    }

    /// Raw pixel bytes in row-major order.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image, returning its raw bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Raw bytes of the pixel at `(x, y)`, including alpha if present.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    #[inline]
    pub fn pixel_bytes(&self, x: u32, y: u32) -> &[u8] {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} image",
            self.width,
            self.height
        );
        let channels = self.format.channels();
        let offset = (y as usize * self.width as usize + x as usize) * channels;
        &self.data[offset..offset + channels]
    }

    /// Color of the pixel at `(x, y)`, alpha ignored.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let bytes = self.pixel_bytes(x, y);
        Rgb::new(bytes[0], bytes[1], bytes[2])
    }

    /// Iterate over pixel colors in row-major order, alpha ignored.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.data
            .chunks_exact(self.format.channels())
            .map(|px| Rgb::new(px[0], px[1], px[2]))
    }

    /// Copy of this image with the alpha channel dropped.
    pub fn to_rgb(&self) -> Image {
        match self.format {
            PixelFormat::Rgb => self.clone(),
            PixelFormat::Rgba => Image {
                width: self.width,
                height: self.height,
                format: PixelFormat::Rgb,
                data: self.pixels().flat_map(|c| c.to_bytes()).collect(),
            },
        }
    }

    /// Set of distinct colors in the image, alpha ignored.
    pub fn distinct_colors(&self) -> HashSet<Rgb> {
        self.pixels().collect()
    }
}
