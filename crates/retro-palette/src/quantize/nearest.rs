//! Nearest-color palette mapping.

use std::collections::HashMap;

use crate::color::Rgb;
use crate::image::{Image, PixelFormat};
use crate::output::IndexedImage;
use crate::palette::Palette;

/// Per-call lookup of already matched source colors.
///
/// Generated art tends to repeat colors heavily, so most pixels hit the memo.
struct NearestCache<'a> {
    palette: &'a Palette,
    memo: HashMap<Rgb, u8>,
}

impl<'a> NearestCache<'a> {
    fn new(palette: &'a Palette) -> Self {
        Self {
            palette,
            memo: HashMap::new(),
        }
    }

    #[inline]
    fn index_of(&mut self, color: Rgb) -> u8 {
        let palette = self.palette;
        // Palette construction caps the length at 256, so the index fits
        *self
            .memo
            .entry(color)
            .or_insert_with(|| palette.find_nearest(color).0 as u8)
    }
}

/// Map every pixel of `image` to the index of its nearest palette color.
///
/// Alpha is ignored. Ties go to the lowest palette index.
pub fn quantize_indexed(image: &Image, palette: &Palette) -> IndexedImage {
    let mut cache = NearestCache::new(palette);
    let indices = image.pixels().map(|px| cache.index_of(px)).collect();
    IndexedImage::new(indices, image.width(), image.height(), palette.clone())
}

/// Replace every pixel of `image` with its nearest palette color.
///
/// The result has the same dimensions and is always RGB: alpha is dropped
/// before matching and not carried into the output. Every output color is a
/// palette entry, and quantizing an already quantized image with the same
/// palette changes nothing.
///
/// # Example
///
/// ```
/// use retro_palette::{quantize, Image, Rgb, GAMEBOY};
///
/// let image = Image::filled(2, 2, Rgb::new(0, 0, 0)).unwrap();
/// let out = quantize(&image, &GAMEBOY);
/// assert_eq!(out.pixel(0, 0), Rgb::new(15, 56, 15));
/// ```
pub fn quantize(image: &Image, palette: &Palette) -> Image {
    let colors = palette.colors();
    let mut cache = NearestCache::new(palette);
    let mut data = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for px in image.pixels() {
        let idx = cache.index_of(px);
        data.extend_from_slice(&colors[idx as usize].to_bytes());
    }
    Image::from_raw_unchecked(image.width(), image.height(), PixelFormat::Rgb, data)
}
