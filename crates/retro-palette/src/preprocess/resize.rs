//! Nearest-neighbor square resize.
//!
//! Every output pixel is a byte-for-byte copy of one source pixel, so no new
//! colors are ever introduced. The source pixel is picked by center sampling:
//! output pixel `d` of `n` reads source pixel `floor((d + 0.5) * src / n)`.

use std::fmt;

use crate::image::Image;

/// Largest accepted target edge length.
pub const MAX_SIZE: u32 = 4096;

/// Error type for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeError {
    /// Target size is zero or above [`MAX_SIZE`]
    InvalidSize(u32),
}

impl fmt::Display for ResizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeError::InvalidSize(size) => {
                write!(
                    f,
                    "target size must be between 1 and {} (got {})",
                    MAX_SIZE, size
                )
            }
        }
    }
}

impl std::error::Error for ResizeError {}

/// Check a target edge length without touching any pixels.
///
/// Callers that do expensive work before resizing (loading a model,
/// decoding a file) should run this first.
pub fn validate_size(size: u32) -> Result<(), ResizeError> {
    if size == 0 || size > MAX_SIZE {
        return Err(ResizeError::InvalidSize(size));
    }
    Ok(())
}

/// Source index sampled for destination index `dst`.
#[inline]
fn source_index(dst: u32, dst_len: u32, src_len: u32) -> usize {
    let idx = ((2 * dst as u64 + 1) * src_len as u64) / (2 * dst_len as u64);
    idx.min(src_len as u64 - 1) as usize
}

/// Resize `image` to exactly `size x size` pixels with nearest-neighbor
/// sampling.
///
/// The pixel format is preserved. Non-square inputs are stretched. Resizing a
/// square image to its own size returns an identical copy, and upscaling
/// follows the same sampling rule.
///
/// # Errors
///
/// [`ResizeError::InvalidSize`] if `size` is zero or above [`MAX_SIZE`].
///
/// # Example
///
/// ```
/// use retro_palette::{downscale, Image, Rgb};
///
/// let image = Image::filled(1024, 1024, Rgb::new(10, 20, 30)).unwrap();
/// let small = downscale(&image, 64).unwrap();
/// assert_eq!(small.dimensions(), (64, 64));
/// assert_eq!(small.pixel(0, 0), Rgb::new(10, 20, 30));
/// ```
pub fn downscale(image: &Image, size: u32) -> Result<Image, ResizeError> {
    validate_size(size)?;

    let (src_w, src_h) = image.dimensions();
    let channels = image.format().channels();
    let src = image.as_raw();
    let src_stride = src_w as usize * channels;

    let columns: Vec<usize> = (0..size)
        .map(|x| source_index(x, size, src_w) * channels)
        .collect();

    let len = (size as usize)
        .checked_mul(size as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(ResizeError::InvalidSize(size))?;
    let mut data = Vec::with_capacity(len);
    for y in 0..size {
        let row_start = source_index(y, size, src_h) * src_stride;
        let row = &src[row_start..row_start + src_stride];
        for &col in &columns {
            data.extend_from_slice(&row[col..col + channels]);
        }
    }

    Ok(Image::from_raw_unchecked(size, size, image.format(), data))
}
